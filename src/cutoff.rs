//! View distance cutoff against the bounds of generated scene content.
//!
//! The fade range must never reach past the nearest edge of generated content, or the effect
//! would reveal ungenerated space. The target ratio is recomputed each frame from the camera
//! position and smoothed so that streamed-in bounds don't make the range snap.

use bevy::prelude::*;

use crate::components::FadeToBackground;
use crate::smoothness::smooth_damp;

/// Axis-aligned world rectangle on the XZ plane covered by generated content.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub x_min: f32,
    pub x_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

/// Bound edge identifier
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsEdge {
    XMin,
    XMax,
    ZMin,
    ZMax,
}

impl WorldBounds {
    pub const fn new(x_min: f32, x_max: f32, z_min: f32, z_max: f32) -> Self {
        Self {
            x_min,
            x_max,
            z_min,
            z_max,
        }
    }

    /// Square of side `size` centered on `center` (its y is ignored).
    pub fn from_center(center: Vec3, size: f32) -> Self {
        let half = size * 0.5;
        Self::new(
            center.x - half,
            center.x + half,
            center.z - half,
            center.z + half,
        )
    }

    /// Perpendicular distance from `position` to each edge, positive inside the bounds.
    pub fn edge_distances(&self, position: Vec3) -> [(BoundsEdge, f32); 4] {
        [
            (BoundsEdge::XMin, position.x - self.x_min),
            (BoundsEdge::XMax, self.x_max - position.x),
            (BoundsEdge::ZMin, position.z - self.z_min),
            (BoundsEdge::ZMax, self.z_max - position.z),
        ]
    }

    /// The edge closest to `position` and the signed distance to it.
    pub fn nearest_edge(&self, position: Vec3) -> (BoundsEdge, f32) {
        self.edge_distances(position)
            .into_iter()
            .fold((BoundsEdge::XMin, f32::INFINITY), |nearest, edge| {
                if edge.1 < nearest.1 { edge } else { nearest }
            })
    }
}

/// Fraction of the configured range that fits between the camera and the nearest bound edge,
/// after keeping `margin_distance` clear. Clamped to `[0, 1]`.
pub fn compute_target_ratio(
    camera_position: Vec3,
    bounds: &WorldBounds,
    margin_distance: f32,
    max_distance: f32,
) -> f32 {
    let (_, edge_distance) = bounds.nearest_edge(camera_position);
    let usable = edge_distance - margin_distance;

    if max_distance <= 0.0 {
        // Zero range: any non-negative clearance is a full fit
        return if usable >= 0.0 { 1.0 } else { 0.0 };
    }

    (usable / max_distance).clamp(0.0, 1.0)
}

/// Bounds published by a scene generation collaborator.
///
/// `None` until the generator has produced its first result. The fade engine reads this from
/// the entity named in [`FadeToBackground::generator`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct GeneratedBounds(pub Option<WorldBounds>);

/// Smoothed distance cutoff ratio of one fade engine.
///
/// Survives deactivation so that a reactivated engine picks up where it left off.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct BoundsCutoff {
    pub target_ratio:  f32,
    pub current_ratio: f32,
    pub velocity:      f32,
}

impl Default for BoundsCutoff {
    fn default() -> Self {
        Self {
            target_ratio:  1.0,
            current_ratio: 1.0,
            velocity:      0.0,
        }
    }
}

impl BoundsCutoff {
    pub fn retarget(&mut self, ratio: f32) { self.target_ratio = ratio.clamp(0.0, 1.0); }

    /// Drops the cutoff: the ratio relaxes back toward the full range.
    pub fn release(&mut self) { self.target_ratio = 1.0; }

    pub fn advance(&mut self, settle_seconds: f32, dt: f32) {
        self.current_ratio = smooth_damp(
            self.current_ratio,
            self.target_ratio,
            &mut self.velocity,
            settle_seconds,
            dt,
        )
        .clamp(0.0, 1.0);
    }
}

/// System that feeds the camera's clearance to the generated bounds into each cutoff smoother
///
/// - No generator configured (or it no longer exposes bounds): the cutoff is released.
/// - Generator present but nothing generated yet, or no camera: the target is left as it was.
pub fn update_bounds_cutoff(
    time: Res<Time>,
    mut fade_query: Query<(&FadeToBackground, &mut BoundsCutoff)>,
    camera_query: Query<&GlobalTransform>,
    generator_query: Query<&GeneratedBounds>,
) {
    let dt = time.delta_secs();

    for (settings, mut cutoff) in &mut fade_query {
        match settings.generator.map(|entity| generator_query.get(entity)) {
            None | Some(Err(_)) => cutoff.release(),
            Some(Ok(GeneratedBounds(None))) => {},
            Some(Ok(GeneratedBounds(Some(bounds)))) => {
                let camera_position = settings
                    .camera
                    .and_then(|entity| camera_query.get(entity).ok())
                    .map(GlobalTransform::translation);

                if let Some(position) = camera_position {
                    cutoff.retarget(compute_target_ratio(
                        position,
                        bounds,
                        settings.cutoff_distance_to_bounds,
                        settings.max_transparent_distance,
                    ));
                }
            },
        }

        cutoff.advance(settings.cutoff_apply_seconds, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_camera_gets_full_range() {
        let bounds = WorldBounds::new(0.0, 100.0, 0.0, 100.0);
        let ratio = compute_target_ratio(Vec3::new(50.0, 3.0, 50.0), &bounds, 10.0, 40.0);
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn camera_inside_margin_gets_no_range() {
        let bounds = WorldBounds::new(0.0, 100.0, 0.0, 100.0);
        let ratio = compute_target_ratio(Vec3::new(50.0, 0.0, 95.0), &bounds, 10.0, 50.0);
        assert_eq!(ratio, 0.0);
    }

    #[test]
    fn partial_clearance_scales_linearly() {
        let bounds = WorldBounds::new(-100.0, 100.0, -100.0, 100.0);
        // 30 units from x_max, minus 10 margin, over 40
        let ratio = compute_target_ratio(Vec3::new(70.0, 0.0, 0.0), &bounds, 10.0, 40.0);
        assert!((ratio - 0.5).abs() < 1e-6);
    }

    #[test]
    fn camera_outside_bounds_clamps_to_zero() {
        let bounds = WorldBounds::new(0.0, 10.0, 0.0, 10.0);
        let ratio = compute_target_ratio(Vec3::new(-5.0, 0.0, 5.0), &bounds, 0.0, 10.0);
        assert_eq!(ratio, 0.0);
    }

    #[test]
    fn nearest_edge_picks_minimum_distance() {
        let bounds = WorldBounds::from_center(Vec3::ZERO, 20.0);
        assert_eq!(
            bounds.nearest_edge(Vec3::new(1.0, 0.0, -8.0)),
            (BoundsEdge::ZMin, 2.0)
        );
        assert_eq!(bounds.nearest_edge(Vec3::new(9.0, 0.0, 0.0)).0, BoundsEdge::XMax);
    }

    #[test]
    fn zero_max_distance_does_not_divide_by_zero() {
        let bounds = WorldBounds::new(0.0, 10.0, 0.0, 10.0);
        assert_eq!(compute_target_ratio(Vec3::splat(5.0), &bounds, 1.0, 0.0), 1.0);
        assert_eq!(compute_target_ratio(Vec3::splat(5.0), &bounds, 6.0, 0.0), 0.0);
    }

    #[test]
    fn cutoff_relaxes_back_to_full_range_after_release() {
        let mut cutoff = BoundsCutoff::default();
        cutoff.retarget(0.2);
        for _ in 0..120 {
            cutoff.advance(0.5, 1.0 / 60.0);
        }
        assert!((cutoff.current_ratio - 0.2).abs() < 0.01);

        cutoff.release();
        for _ in 0..120 {
            cutoff.advance(0.5, 1.0 / 60.0);
        }
        assert!((cutoff.current_ratio - 1.0).abs() < 0.01);
    }
}

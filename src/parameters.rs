//! Combines transition, curve and cutoff into the values a fade-to-background renderer consumes.

use bevy::prelude::*;

use crate::animation::FadeTransition;
use crate::components::AnimationMode;
use crate::components::FadeToBackground;
use crate::cutoff::BoundsCutoff;

/// Per-engine render parameters, rewritten every frame while the engine has a camera.
///
/// Distances are published squared so the renderer can compare against squared view distances.
/// `opaque_distance_squared <= transparent_distance_squared` always holds. When `active` is false
/// the renderer should bypass the effect entirely.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct FadeRenderParameters {
    pub active:                       bool,
    pub camera_position:              Vec3,
    pub opaque_distance_squared:      f32,
    pub transparent_distance_squared: f32,
    pub opacity:                      f32,
}

impl FadeRenderParameters {
    /// Bypassed effect: zero range at full opacity.
    pub const DISABLED: Self = Self {
        active:                       false,
        camera_position:              Vec3::ZERO,
        opaque_distance_squared:      0.0,
        transparent_distance_squared: 0.0,
        opacity:                      1.0,
    };

    pub fn opaque_distance(&self) -> f32 { self.opaque_distance_squared.sqrt() }

    pub fn transparent_distance(&self) -> f32 { self.transparent_distance_squared.sqrt() }
}

impl Default for FadeRenderParameters {
    fn default() -> Self { Self::DISABLED }
}

/// Builds the published parameters from the curve ratio at the current animation second and
/// the smoothed cutoff ratio. The cutoff scales distances only, never opacity.
pub fn compose_parameters(
    settings: &FadeToBackground,
    animation_ratio: f32,
    cutoff_ratio: f32,
    camera_position: Vec3,
) -> FadeRenderParameters {
    let (opaque, transparent, opacity) = match settings.mode {
        AnimationMode::Swipe => (
            settings.max_opaque_distance * animation_ratio,
            settings.max_transparent_distance * animation_ratio,
            settings.max_opacity,
        ),
        AnimationMode::Fade => (
            settings.max_opaque_distance,
            settings.max_transparent_distance,
            settings.max_opacity * animation_ratio,
        ),
    };

    let transparent = cutoff_ratio * transparent;
    let opaque = (cutoff_ratio * opaque).min(transparent);

    FadeRenderParameters {
        active: true,
        camera_position,
        opaque_distance_squared: opaque * opaque,
        transparent_distance_squared: transparent * transparent,
        opacity,
    }
}

/// World position of the engine's camera, if it is set and still has a `GlobalTransform`.
pub(crate) fn resolve_camera_position(
    settings: &FadeToBackground,
    camera_query: &Query<&GlobalTransform>,
) -> Option<Vec3> {
    settings
        .camera
        .and_then(|entity| camera_query.get(entity).ok())
        .map(GlobalTransform::translation)
}

/// System that publishes render parameters for every active engine
///
/// Engines without a resolvable camera publish [`FadeRenderParameters::DISABLED`] instead of
/// computing against missing geometry.
pub fn publish_render_parameters(
    mut fade_query: Query<(
        &FadeToBackground,
        &FadeTransition,
        &BoundsCutoff,
        &mut FadeRenderParameters,
    )>,
    camera_query: Query<&GlobalTransform>,
) {
    for (settings, transition, cutoff, mut parameters) in &mut fade_query {
        let Some(camera_position) = resolve_camera_position(settings, &camera_query) else {
            parameters.set_if_neq(FadeRenderParameters::DISABLED);
            continue;
        };

        let animation_ratio = settings.curve.evaluate(transition.current_second());
        parameters.set_if_neq(compose_parameters(
            settings,
            animation_ratio,
            cutoff.current_ratio,
            camera_position,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(mode: AnimationMode) -> FadeToBackground {
        FadeToBackground::default()
            .with_mode(mode)
            .with_max_opacity(0.8)
            .with_distances(100.0, 200.0)
    }

    #[test]
    fn swipe_scales_distances_and_holds_opacity() {
        let parameters = compose_parameters(&settings(AnimationMode::Swipe), 0.5, 1.0, Vec3::ONE);
        assert!(parameters.active);
        assert_eq!(parameters.camera_position, Vec3::ONE);
        assert!((parameters.opaque_distance() - 50.0).abs() < 1e-3);
        assert!((parameters.transparent_distance() - 100.0).abs() < 1e-3);
        assert_eq!(parameters.opacity, 0.8);
    }

    #[test]
    fn fade_scales_opacity_and_holds_distances() {
        let parameters = compose_parameters(&settings(AnimationMode::Fade), 0.5, 1.0, Vec3::ZERO);
        assert_eq!(parameters.opaque_distance_squared, 100.0 * 100.0);
        assert_eq!(parameters.transparent_distance_squared, 200.0 * 200.0);
        assert!((parameters.opacity - 0.4).abs() < 1e-6);
    }

    #[test]
    fn cutoff_scales_distances_but_not_opacity() {
        let parameters = compose_parameters(&settings(AnimationMode::Fade), 1.0, 0.25, Vec3::ZERO);
        assert!((parameters.opaque_distance() - 25.0).abs() < 1e-3);
        assert!((parameters.transparent_distance() - 50.0).abs() < 1e-3);
        assert_eq!(parameters.opacity, 0.8);
    }

    #[test]
    fn opaque_never_exceeds_transparent() {
        // Equal maxima: rounding in the cutoff product must not invert the pair
        let equal = FadeToBackground::default().with_distances(123.456, 123.456);
        for step in 0..=100 {
            let cutoff = step as f32 / 100.0;
            let parameters = compose_parameters(&equal, 0.7, cutoff, Vec3::ZERO);
            assert!(parameters.opaque_distance_squared <= parameters.transparent_distance_squared);
        }
    }

    #[test]
    fn disabled_parameters_bypass_the_effect() {
        let disabled = FadeRenderParameters::default();
        assert!(!disabled.active);
        assert_eq!(disabled.opacity, 1.0);
        assert!(disabled.opaque_distance_squared <= disabled.transparent_distance_squared);
    }
}

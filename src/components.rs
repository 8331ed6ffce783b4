//! Settings and bookkeeping components of a fade engine entity.

use bevy::prelude::*;

use crate::animation::FadeTransition;
use crate::curve::FadeCurve;
use crate::cutoff::BoundsCutoff;
use crate::error::FadeConfigError;
use crate::parameters::FadeRenderParameters;

/// Which output channel the animation curve drives. The other channel is held at its maximum.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationMode {
    /// The fade distances start narrow and widen.
    #[default]
    Swipe,
    /// The opacity starts transparent and becomes opaque.
    Fade,
}

/// How the transition starts each time the engine is activated.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnEnableBehavior {
    /// Start hidden and immediately play the appear animation.
    #[default]
    PlayAppear,
    /// Start hidden and wait for an explicit appear request.
    StartInvisible,
    /// Start fully revealed.
    StartVisible,
    /// Start hidden and appear once the scene generator reports `GenerationFinished`.
    AppearAfterExternalSignal,
}

/// A fade-to-background engine. Adding this component activates the engine, removing it (or
/// despawning the entity) deactivates it.
///
/// The transition state, cutoff smoother and published parameters live in the required
/// components [`FadeTransition`], [`BoundsCutoff`] and [`FadeRenderParameters`].
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
#[require(FadeTransition, BoundsCutoff, FadeRenderParameters)]
pub struct FadeToBackground {
    /// Camera whose position the effect is centered on. Without one nothing is published.
    pub camera:                    Option<Entity>,
    /// Scene generator exposing `GeneratedBounds`. Leave empty to disable the bounds cutoff.
    pub generator:                 Option<Entity>,
    /// Clearance kept between the fade range and the nearest generated bound.
    pub cutoff_distance_to_bounds: f32,
    /// Seconds it takes to adapt to new bounds.
    pub cutoff_apply_seconds:      f32,
    /// Opacity ceiling of every faded material, in `[0, 1]`.
    pub max_opacity:               f32,
    /// Distance at which materials start fading out.
    pub max_opaque_distance:       f32,
    /// Distance at which materials are fully faded out.
    pub max_transparent_distance:  f32,
    pub on_enable:                 OnEnableBehavior,
    pub mode:                      AnimationMode,
    /// Maps animation time to the effect ratio. Played backwards while disappearing.
    pub curve:                     FadeCurve,
}

impl Default for FadeToBackground {
    fn default() -> Self {
        Self {
            camera:                    None,
            generator:                 None,
            cutoff_distance_to_bounds: 50.0,
            cutoff_apply_seconds:      1.0,
            max_opacity:               1.0,
            max_opaque_distance:       100.0,
            max_transparent_distance:  200.0,
            on_enable:                 OnEnableBehavior::default(),
            mode:                      AnimationMode::default(),
            curve:                     FadeCurve::default(),
        }
    }
}

impl FadeToBackground {
    pub fn with_camera(mut self, camera: Entity) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_generator(mut self, generator: Entity) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_cutoff(mut self, distance_to_bounds: f32, apply_seconds: f32) -> Self {
        self.cutoff_distance_to_bounds = distance_to_bounds;
        self.cutoff_apply_seconds = apply_seconds;
        self
    }

    pub fn with_max_opacity(mut self, max_opacity: f32) -> Self {
        self.max_opacity = max_opacity;
        self
    }

    pub fn with_distances(mut self, opaque: f32, transparent: f32) -> Self {
        self.max_opaque_distance = opaque;
        self.max_transparent_distance = transparent;
        self
    }

    pub fn with_on_enable(mut self, on_enable: OnEnableBehavior) -> Self {
        self.on_enable = on_enable;
        self
    }

    pub fn with_mode(mut self, mode: AnimationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_curve(mut self, curve: FadeCurve) -> Self {
        self.curve = curve;
        self
    }

    /// Checks the ranges the published parameters rely on.
    pub fn validate(&self) -> Result<(), FadeConfigError> {
        self.curve.validate()?;
        if !(0.0..=1.0).contains(&self.max_opacity) {
            return Err(FadeConfigError::OpacityOutOfRange(self.max_opacity));
        }
        for (name, value) in [
            ("max_opaque_distance", self.max_opaque_distance),
            ("max_transparent_distance", self.max_transparent_distance),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(FadeConfigError::NegativeDistance { name, value });
            }
        }
        if self.max_opaque_distance > self.max_transparent_distance {
            return Err(FadeConfigError::OpaqueBeyondTransparent {
                opaque:      self.max_opaque_distance,
                transparent: self.max_transparent_distance,
            });
        }
        for (name, value) in [
            ("cutoff_distance_to_bounds", self.cutoff_distance_to_bounds),
            ("cutoff_apply_seconds", self.cutoff_apply_seconds),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(FadeConfigError::NegativeCutoff { name, value });
            }
        }
        Ok(())
    }
}

/// Observer entity registered on the scene generator for `GenerationFinished`.
/// Despawned when the engine deactivates.
#[derive(Component, Debug, Clone, Copy)]
pub struct GenerationListener(pub Entity);

/// Marker for a pending `PlayFinalDisappear` request. Removed when `FinalDisappearFinished`
/// fires.
#[derive(Component, Reflect, Debug, Default)]
#[reflect(Component)]
pub struct AwaitingFinalDisappear;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(FadeToBackground::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_out_of_range_settings() {
        assert_eq!(
            FadeToBackground::default().with_max_opacity(1.5).validate(),
            Err(FadeConfigError::OpacityOutOfRange(1.5))
        );
        assert!(matches!(
            FadeToBackground::default()
                .with_distances(-1.0, 10.0)
                .validate(),
            Err(FadeConfigError::NegativeDistance {
                name: "max_opaque_distance",
                ..
            })
        ));
        assert!(matches!(
            FadeToBackground::default()
                .with_distances(300.0, 200.0)
                .validate(),
            Err(FadeConfigError::OpaqueBeyondTransparent { .. })
        ));
        assert!(matches!(
            FadeToBackground::default().with_cutoff(10.0, -1.0).validate(),
            Err(FadeConfigError::NegativeCutoff {
                name: "cutoff_apply_seconds",
                ..
            })
        ));
    }
}

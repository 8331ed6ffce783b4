//! Configuration faults raised when a fade engine is activated.

use thiserror::Error;

/// Invalid fade configuration.
///
/// Returned by [`FadeCurve::new`](crate::FadeCurve::new) and
/// [`FadeToBackground::validate`](crate::FadeToBackground::validate). The activation observer
/// propagates it into Bevy's error handler, so a misconfigured engine fails once, loudly, when it
/// becomes active.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FadeConfigError {
    #[error("animation curve has no keyframes")]
    EmptyCurve,

    #[error("keyframe {index} at t={time} does not come after the previous keyframe at t={previous}")]
    UnsortedKeyframes { index: usize, previous: f32, time: f32 },

    #[error("keyframe {index} has a non-finite time, value or tangent")]
    NonFiniteKeyframe { index: usize },

    #[error("max opacity {0} is outside [0, 1]")]
    OpacityOutOfRange(f32),

    #[error("{name} must be a finite value >= 0, got {value}")]
    NegativeDistance { name: &'static str, value: f32 },

    #[error("max opaque distance {opaque} exceeds max transparent distance {transparent}")]
    OpaqueBeyondTransparent { opaque: f32, transparent: f32 },

    #[error("{name} must be a finite value >= 0, got {value}")]
    NegativeCutoff { name: &'static str, value: f32 },
}

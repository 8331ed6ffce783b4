//! Convenient re-exports for common types and events

pub use crate::AnimationMode;
pub use crate::AppearAnimationFinished;
pub use crate::BoundsCutoff;
pub use crate::DisappearAnimationFinished;
pub use crate::FadeCurve;
pub use crate::FadePhase;
pub use crate::FadeRenderParameters;
pub use crate::FadeToBackground;
pub use crate::FadeToBackgroundPlugin;
pub use crate::FadeToBackgroundSystems;
pub use crate::FadeTransition;
pub use crate::FinalDisappearFinished;
pub use crate::GeneratedBounds;
pub use crate::GenerationFinished;
pub use crate::Keyframe;
pub use crate::OnEnableBehavior;
pub use crate::PlayAppear;
pub use crate::PlayDisappear;
pub use crate::PlayFinalDisappear;
pub use crate::PlayUninterruptibleDisappear;
pub use crate::ToggleFade;
pub use crate::UninterruptibleDisappearAnimationFinished;
pub use crate::WorldBounds;

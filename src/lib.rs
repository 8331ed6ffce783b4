// bevy_fade_to_background
// Distance-based fade-to-background transitions for Bevy scenes:
// - Appear/disappear animation state machine with uninterruptible fade-outs
// - Bounds cutoff that keeps the fade range inside generated content
// - Per-engine render parameters for an external fade renderer

use bevy::prelude::*;

mod animation;
mod components;
mod curve;
mod cutoff;
mod error;
mod events;
mod observers;
mod parameters;
pub mod prelude;
mod smoothness;

// Public API - Request events
pub use events::PlayAppear;
pub use events::PlayDisappear;
pub use events::PlayFinalDisappear;
pub use events::PlayUninterruptibleDisappear;
pub use events::ToggleFade;

// Public API - Lifecycle events
pub use events::AppearAnimationFinished;
pub use events::DisappearAnimationFinished;
pub use events::FinalDisappearFinished;
pub use events::UninterruptibleDisappearAnimationFinished;

// Public API - Scene generator contract
pub use cutoff::GeneratedBounds;
pub use cutoff::WorldBounds;
pub use events::GenerationFinished;

// Public API - Components (configuration and state)
pub use animation::FadeTransition;
pub use components::AwaitingFinalDisappear;
pub use components::FadeToBackground;
pub use components::GenerationListener;
pub use cutoff::BoundsCutoff;
pub use parameters::FadeRenderParameters;

// Public API - Value types
pub use animation::FadePhase;
pub use animation::PlayDirection;
pub use animation::TransitionEvent;
pub use components::AnimationMode;
pub use components::OnEnableBehavior;
pub use curve::FadeCurve;
pub use curve::Keyframe;
pub use cutoff::BoundsEdge;
pub use error::FadeConfigError;

// Public API - Utility functions
pub use cutoff::compute_target_ratio;
pub use parameters::compose_parameters;
pub use smoothness::SETTLE_RATE;
pub use smoothness::smooth_damp;

// Internal - used by plugin, not for external use
use animation::advance_fade_transitions;
use cutoff::update_bounds_cutoff;
use observers::{
    activate_on_add, deactivate_on_remove, finish_final_disappear,
    finish_final_disappear_uninterruptible, on_play_appear, on_play_disappear,
    on_play_final_disappear, on_play_uninterruptible_disappear, on_toggle_fade,
};
use parameters::publish_render_parameters;

/// System set containing the per-frame fade update, in order: advance transitions, recompute
/// bounds cutoffs, publish render parameters.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FadeToBackgroundSystems;

/// Plugin that drives every `FadeToBackground` engine
pub struct FadeToBackgroundPlugin;

impl Plugin for FadeToBackgroundPlugin {
    fn build(&self, app: &mut App) {
        app
            // Register observers for component lifecycle events
            .add_observer(activate_on_add)
            .add_observer(deactivate_on_remove)
            // Register observers for requests
            .add_observer(on_play_appear)
            .add_observer(on_play_disappear)
            .add_observer(on_play_uninterruptible_disappear)
            .add_observer(on_toggle_fade)
            .add_observer(on_play_final_disappear)
            // Register observers for the scene swap handoff
            .add_observer(finish_final_disappear)
            .add_observer(finish_final_disappear_uninterruptible)
            // Add systems
            .add_systems(
                Update,
                (
                    advance_fade_transitions,
                    update_bounds_cutoff,
                    publish_render_parameters,
                )
                    .chain()
                    .in_set(FadeToBackgroundSystems),
            );
    }
}

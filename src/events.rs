//! Request and lifecycle events of fade engines.

use bevy::prelude::*;

use crate::animation::TransitionEvent;

// ============================================================================
// Requests
// ============================================================================

/// Plays the appear animation. Ignored while an uninterruptible disappear is in flight.
#[derive(EntityEvent, Reflect)]
#[reflect(Event, FromReflect)]
pub struct PlayAppear {
    pub entity: Entity,
}

/// Plays the disappear animation, interrupting an appear in progress.
#[derive(EntityEvent, Reflect)]
#[reflect(Event, FromReflect)]
pub struct PlayDisappear {
    pub entity: Entity,
}

/// Plays the disappear animation and ignores appear requests until it finishes.
#[derive(EntityEvent, Reflect)]
#[reflect(Event, FromReflect)]
pub struct PlayUninterruptibleDisappear {
    pub entity: Entity,
}

/// Disappears when heading forward, appears otherwise.
#[derive(EntityEvent, Reflect)]
#[reflect(Event, FromReflect)]
pub struct ToggleFade {
    pub entity: Entity,
}

/// Fades out before a scene swap. `FinalDisappearFinished` fires once the engine is hidden,
/// immediately if it already is.
#[derive(EntityEvent, Reflect)]
#[reflect(Event, FromReflect)]
pub struct PlayFinalDisappear {
    pub entity: Entity,
}

impl PlayAppear {
    pub const fn new(entity: Entity) -> Self { Self { entity } }
}

impl PlayDisappear {
    pub const fn new(entity: Entity) -> Self { Self { entity } }
}

impl PlayUninterruptibleDisappear {
    pub const fn new(entity: Entity) -> Self { Self { entity } }
}

impl ToggleFade {
    pub const fn new(entity: Entity) -> Self { Self { entity } }
}

impl PlayFinalDisappear {
    pub const fn new(entity: Entity) -> Self { Self { entity } }
}

// ============================================================================
// Transition lifecycle
// ============================================================================

/// Fired on the frame the appear animation reaches its end second.
#[derive(EntityEvent, Reflect)]
#[reflect(Event, FromReflect)]
pub struct AppearAnimationFinished {
    pub entity: Entity,
}

/// Fired on the frame the disappear animation reaches its begin second.
#[derive(EntityEvent, Reflect)]
#[reflect(Event, FromReflect)]
pub struct DisappearAnimationFinished {
    pub entity: Entity,
}

/// Fired when an uninterruptible disappear completes, including the instant case where the
/// engine was already hidden.
#[derive(EntityEvent, Reflect)]
#[reflect(Event, FromReflect)]
pub struct UninterruptibleDisappearAnimationFinished {
    pub entity: Entity,
}

/// Fired once per `PlayFinalDisappear` request when it is safe to swap the scene.
#[derive(EntityEvent, Reflect)]
#[reflect(Event, FromReflect)]
pub struct FinalDisappearFinished {
    pub entity: Entity,
}

// ============================================================================
// Scene generation
// ============================================================================

/// Triggered by a scene generator on its own entity when a generation pass completes.
#[derive(EntityEvent, Reflect)]
#[reflect(Event, FromReflect)]
pub struct GenerationFinished {
    pub entity: Entity,
}

impl GenerationFinished {
    pub const fn new(generator: Entity) -> Self { Self { entity: generator } }
}

/// Triggers the entity event matching a state machine completion.
pub(crate) fn emit_transition_event(
    commands: &mut Commands,
    entity: Entity,
    event: TransitionEvent,
) {
    debug!("FadeToBackground {entity:?}: {event:?}");

    match event {
        TransitionEvent::AppearFinished => {
            commands.trigger(AppearAnimationFinished { entity });
        },
        TransitionEvent::DisappearFinished => {
            commands.trigger(DisappearAnimationFinished { entity });
        },
        TransitionEvent::UninterruptibleDisappearFinished => {
            commands.trigger(UninterruptibleDisappearAnimationFinished { entity });
        },
    }
}

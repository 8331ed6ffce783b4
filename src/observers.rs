//! Observers that wire activation, requests and completion events to the transition state.

use bevy::prelude::*;

use crate::animation::FadeTransition;
use crate::components::AwaitingFinalDisappear;
use crate::components::FadeToBackground;
use crate::components::GenerationListener;
use crate::components::OnEnableBehavior;
use crate::cutoff::BoundsCutoff;
use crate::events::DisappearAnimationFinished;
use crate::events::FinalDisappearFinished;
use crate::events::GenerationFinished;
use crate::events::PlayAppear;
use crate::events::PlayDisappear;
use crate::events::PlayFinalDisappear;
use crate::events::PlayUninterruptibleDisappear;
use crate::events::ToggleFade;
use crate::events::UninterruptibleDisappearAnimationFinished;
use crate::events::emit_transition_event;
use crate::parameters::FadeRenderParameters;
use crate::parameters::compose_parameters;
use crate::parameters::resolve_camera_position;

// ============================================================================
// Activation
// ============================================================================

/// Observer that activates an engine when `FadeToBackground` is added.
///
/// Invalid settings are returned as an error, which Bevy's error handler reports (and by
/// default panics on) at the moment the engine goes live.
pub fn activate_on_add(
    add: On<Add, FadeToBackground>,
    mut commands: Commands,
    mut fade_query: Query<(
        &FadeToBackground,
        &mut FadeTransition,
        &BoundsCutoff,
        &mut FadeRenderParameters,
    )>,
    camera_query: Query<&GlobalTransform>,
) -> Result {
    let entity = add.entity;

    let Ok((settings, mut transition, cutoff, mut parameters)) = fade_query.get_mut(entity) else {
        return Ok(());
    };

    settings.validate()?;

    *transition = FadeTransition::activated(&settings.curve, settings.on_enable);

    // Seek right away so the initial state is visible before the next update
    *parameters = match resolve_camera_position(settings, &camera_query) {
        Some(camera_position) => compose_parameters(
            settings,
            settings.curve.evaluate(transition.current_second()),
            cutoff.current_ratio,
            camera_position,
        ),
        None => FadeRenderParameters::DISABLED,
    };

    if settings.on_enable == OnEnableBehavior::AppearAfterExternalSignal {
        match settings.generator {
            Some(generator) => {
                let listener = spawn_generation_listener(&mut commands, entity, generator);
                commands.entity(entity).insert(GenerationListener(listener));
            },
            None => error!(
                "FadeToBackground {entity:?}: AppearAfterExternalSignal needs a generator; \
                 staying hidden until PlayAppear is requested"
            ),
        }
    }

    if settings.camera.is_none() {
        warn!("FadeToBackground {entity:?}: no camera set, render parameters stay disabled");
    }

    info!(
        "FadeToBackground {entity:?} activated: on_enable={:?} mode={:?} span=[{:.2}, {:.2}]",
        settings.on_enable,
        settings.mode,
        transition.begin_second(),
        transition.end_second()
    );

    Ok(())
}

/// Observer that deactivates an engine when `FadeToBackground` is removed or its entity
/// despawned. The in-flight animation is abandoned: no finished events fire.
pub fn deactivate_on_remove(
    remove: On<Remove, FadeToBackground>,
    mut commands: Commands,
    mut fade_query: Query<(
        &mut FadeTransition,
        &mut FadeRenderParameters,
        Option<&GenerationListener>,
    )>,
) {
    let entity = remove.entity;

    let Ok((mut transition, mut parameters, listener)) = fade_query.get_mut(entity) else {
        return;
    };

    transition.reset();
    *parameters = FadeRenderParameters::DISABLED;

    if let Some(GenerationListener(observer)) = listener
        && let Ok(mut observer_commands) = commands.get_entity(*observer)
    {
        observer_commands.try_despawn();
    }
    commands
        .entity(entity)
        .try_remove::<(GenerationListener, AwaitingFinalDisappear)>();

    info!("FadeToBackground {entity:?} deactivated");
}

/// Registers an observer on `generator` that plays the appear animation of `fade_entity`
/// whenever a generation pass finishes. Returns the observer entity.
fn spawn_generation_listener(
    commands: &mut Commands,
    fade_entity: Entity,
    generator: Entity,
) -> Entity {
    let observer = Observer::new(
        move |_finished: On<GenerationFinished>, mut fade_query: Query<&mut FadeTransition>| {
            if let Ok(mut transition) = fade_query.get_mut(fade_entity) {
                debug!("FadeToBackground {fade_entity:?}: generation finished, appearing");
                transition.play_appear();
            }
        },
    )
    .with_entity(generator);

    commands.spawn(observer).id()
}

// ============================================================================
// Requests
// ============================================================================

/// Observer for `PlayAppear`
pub fn on_play_appear(
    request: On<PlayAppear>,
    mut fade_query: Query<&mut FadeTransition, With<FadeToBackground>>,
) {
    if let Ok(mut transition) = fade_query.get_mut(request.entity) {
        transition.play_appear();
    }
}

/// Observer for `PlayDisappear`
pub fn on_play_disappear(
    request: On<PlayDisappear>,
    mut fade_query: Query<&mut FadeTransition, With<FadeToBackground>>,
) {
    if let Ok(mut transition) = fade_query.get_mut(request.entity) {
        transition.play_disappear();
    }
}

/// Observer for `PlayUninterruptibleDisappear` - emits the finished event right away when the
/// engine is already hidden.
pub fn on_play_uninterruptible_disappear(
    request: On<PlayUninterruptibleDisappear>,
    mut commands: Commands,
    mut fade_query: Query<&mut FadeTransition, With<FadeToBackground>>,
) {
    let entity = request.entity;

    let Ok(mut transition) = fade_query.get_mut(entity) else {
        return;
    };

    if let Some(event) = transition.play_uninterruptible_disappear() {
        emit_transition_event(&mut commands, entity, event);
    }
}

/// Observer for `ToggleFade`
pub fn on_toggle_fade(
    request: On<ToggleFade>,
    mut fade_query: Query<&mut FadeTransition, With<FadeToBackground>>,
) {
    if let Ok(mut transition) = fade_query.get_mut(request.entity) {
        transition.toggle();
    }
}

// ============================================================================
// Scene swap handoff
// ============================================================================

/// Observer for `PlayFinalDisappear` - plays the disappear and answers with
/// `FinalDisappearFinished` once the clock rests at the begin second. Entities without an active engine are answered immediately so a swap never stalls.
pub fn on_play_final_disappear(
    request: On<PlayFinalDisappear>,
    mut commands: Commands,
    mut fade_query: Query<&mut FadeTransition, With<FadeToBackground>>,
) {
    let entity = request.entity;

    let Ok(mut transition) = fade_query.get_mut(entity) else {
        debug!("PlayFinalDisappear: no active engine on {entity:?}, finishing immediately");
        commands.trigger(FinalDisappearFinished { entity });
        return;
    };

    transition.play_disappear();

    // Resting at the begin second: no tick will cross it, so nothing is left to wait for
    if transition.is_at_begin() {
        commands.trigger(FinalDisappearFinished { entity });
        return;
    }

    commands.entity(entity).insert(AwaitingFinalDisappear);
}

/// Observer that completes a pending final disappear
pub fn finish_final_disappear(
    finished: On<DisappearAnimationFinished>,
    commands: Commands,
    pending_query: Query<(), With<AwaitingFinalDisappear>>,
) {
    resolve_final_disappear(finished.entity, commands, &pending_query);
}

/// Observer that completes a pending final disappear when an uninterruptible disappear was
/// already running toward hidden
pub fn finish_final_disappear_uninterruptible(
    finished: On<UninterruptibleDisappearAnimationFinished>,
    commands: Commands,
    pending_query: Query<(), With<AwaitingFinalDisappear>>,
) {
    resolve_final_disappear(finished.entity, commands, &pending_query);
}

fn resolve_final_disappear(
    entity: Entity,
    mut commands: Commands,
    pending_query: &Query<(), With<AwaitingFinalDisappear>>,
) {
    if pending_query.get(entity).is_err() {
        return;
    }

    // Remove the marker BEFORE triggering: a listener may immediately request another fade-out
    commands.entity(entity).remove::<AwaitingFinalDisappear>();
    commands.trigger(FinalDisappearFinished { entity });
}

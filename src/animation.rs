//! Appear/disappear transition state machine and the system that advances it.
//!
//! The transition scrubs a clock between the curve's begin and end second. Playing forward
//! reveals the scene, playing backward hides it. Completion is edge-triggered: a finished event
//! fires on the tick that reaches a bound, never while resting on it.

use bevy::prelude::*;

use crate::components::FadeToBackground;
use crate::components::OnEnableBehavior;
use crate::curve::FadeCurve;
use crate::events::emit_transition_event;

/// Direction the transition clock runs in.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayDirection {
    /// Toward the end second (appearing).
    Forward,
    /// Toward the begin second (disappearing).
    #[default]
    Backward,
}

/// Coarse state of a transition, derived from direction and clock.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadePhase {
    Hidden,
    Appearing,
    Visible,
    Disappearing,
}

/// Completion signal produced by the state machine.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    AppearFinished,
    DisappearFinished,
    UninterruptibleDisappearFinished,
}

/// Transition state of one fade engine.
///
/// Invariant: `begin_second <= current_second <= end_second`. The uninterruptible lock is only
/// held while an uninterruptible disappear is in flight; while held, appear requests are ignored.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct FadeTransition {
    direction:       PlayDirection,
    current_second:  f32,
    uninterruptible: bool,
    begin_second:    f32,
    end_second:      f32,
}

impl Default for FadeTransition {
    fn default() -> Self { Self::hidden(&FadeCurve::default()) }
}

impl FadeTransition {
    /// Hidden transition spanning `curve`.
    pub fn hidden(curve: &FadeCurve) -> Self {
        Self {
            direction:       PlayDirection::Backward,
            current_second:  curve.begin(),
            uninterruptible: false,
            begin_second:    curve.begin(),
            end_second:      curve.end(),
        }
    }

    /// Initial state for an activation with the given behavior.
    pub fn activated(curve: &FadeCurve, behavior: OnEnableBehavior) -> Self {
        let mut transition = Self::hidden(curve);
        match behavior {
            OnEnableBehavior::PlayAppear => transition.direction = PlayDirection::Forward,
            OnEnableBehavior::StartInvisible | OnEnableBehavior::AppearAfterExternalSignal => {},
            OnEnableBehavior::StartVisible => {
                transition.direction = PlayDirection::Forward;
                transition.current_second = transition.end_second;
            },
        }
        transition
    }

    /// Snaps to hidden without animating and drops the lock. No events fire.
    pub fn reset(&mut self) {
        self.direction = PlayDirection::Backward;
        self.current_second = self.begin_second;
        self.uninterruptible = false;
    }

    /// Plays toward visible. Ignored while an uninterruptible disappear is in flight.
    pub fn play_appear(&mut self) {
        if !self.uninterruptible {
            self.direction = PlayDirection::Forward;
        }
    }

    /// Plays toward hidden, interrupting an appear in progress.
    pub fn play_disappear(&mut self) { self.direction = PlayDirection::Backward; }

    /// Plays toward hidden and locks out appear requests until hidden is reached.
    ///
    /// When already at the begin second nothing needs to animate: the direction is left alone,
    /// the lock is released right away and the finished event is returned for the caller to emit.
    pub fn play_uninterruptible_disappear(&mut self) -> Option<TransitionEvent> {
        if self.is_at_begin() {
            self.uninterruptible = false;
            return Some(TransitionEvent::UninterruptibleDisappearFinished);
        }
        self.direction = PlayDirection::Backward;
        self.uninterruptible = true;
        None
    }

    /// Reverses the direction: disappear when heading forward, appear otherwise.
    /// Ignored while the uninterruptible lock is held.
    pub fn toggle(&mut self) {
        if self.uninterruptible {
            return;
        }
        match self.direction {
            PlayDirection::Forward => self.play_disappear(),
            PlayDirection::Backward => self.play_appear(),
        }
    }

    /// Advances the clock by `dt` seconds in the current direction, clamping to the span.
    /// Returns the finished event when a bound is reached on this tick.
    pub fn tick(&mut self, dt: f32) -> Option<TransitionEvent> {
        if !self.is_animating() || dt <= 0.0 {
            return None;
        }

        match self.direction {
            PlayDirection::Forward => {
                self.current_second = (self.current_second + dt).min(self.end_second);
                (self.current_second >= self.end_second).then_some(TransitionEvent::AppearFinished)
            },
            PlayDirection::Backward => {
                self.current_second = (self.current_second - dt).max(self.begin_second);
                if self.current_second > self.begin_second {
                    return None;
                }
                if self.uninterruptible {
                    self.uninterruptible = false;
                    Some(TransitionEvent::UninterruptibleDisappearFinished)
                } else {
                    Some(TransitionEvent::DisappearFinished)
                }
            },
        }
    }

    /// Follows edits to the curve, re-clamping the clock into the new span. A curve edited into
    /// an inverted or non-finite span is ignored until it is valid again.
    pub fn sync_span(&mut self, curve: &FadeCurve) {
        let (begin, end) = (curve.begin(), curve.end());
        if !begin.is_finite() || !end.is_finite() || begin > end {
            return;
        }
        self.begin_second = begin;
        self.end_second = end;
        self.current_second = self
            .current_second
            .clamp(self.begin_second, self.end_second);
    }

    pub fn is_animating(&self) -> bool {
        match self.direction {
            PlayDirection::Forward => self.current_second < self.end_second,
            PlayDirection::Backward => self.current_second > self.begin_second,
        }
    }

    pub fn phase(&self) -> FadePhase {
        match (self.direction, self.is_animating()) {
            (PlayDirection::Forward, true) => FadePhase::Appearing,
            (PlayDirection::Forward, false) => FadePhase::Visible,
            (PlayDirection::Backward, true) => FadePhase::Disappearing,
            (PlayDirection::Backward, false) => FadePhase::Hidden,
        }
    }

    /// Clock resting at the begin second, whatever the direction.
    pub fn is_at_begin(&self) -> bool { self.current_second <= self.begin_second }

    /// Heading backward and resting at the begin second.
    pub fn is_completely_faded_out(&self) -> bool { self.phase() == FadePhase::Hidden }

    pub const fn direction(&self) -> PlayDirection { self.direction }

    pub fn is_playing_forward(&self) -> bool { self.direction == PlayDirection::Forward }

    pub const fn is_playing_uninterruptible_disappear(&self) -> bool { self.uninterruptible }

    pub const fn current_second(&self) -> f32 { self.current_second }

    pub const fn begin_second(&self) -> f32 { self.begin_second }

    pub const fn end_second(&self) -> f32 { self.end_second }

    pub fn duration(&self) -> f32 { self.end_second - self.begin_second }
}

/// System that advances every active transition by the frame time and emits finished events
pub fn advance_fade_transitions(
    mut commands: Commands,
    time: Res<Time>,
    mut fade_query: Query<(Entity, &FadeToBackground, &mut FadeTransition)>,
) {
    let dt = time.delta_secs();

    for (entity, settings, mut transition) in &mut fade_query {
        transition.sync_span(&settings.curve);

        if let Some(event) = transition.tick(dt) {
            emit_transition_event(&mut commands, entity, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::reflect::GetField;

    use super::*;
    use crate::curve::Keyframe;

    const FRAME: f32 = 1.0 / 60.0;

    fn run(transition: &mut FadeTransition, seconds: f32) -> Vec<TransitionEvent> {
        let frames = (seconds / FRAME).ceil() as usize;
        (0..frames).filter_map(|_| transition.tick(FRAME)).collect()
    }

    #[test]
    fn activation_resolves_initial_state() {
        let curve = FadeCurve::default();

        let appear = FadeTransition::activated(&curve, OnEnableBehavior::PlayAppear);
        assert_eq!(appear.current_second(), 0.0);
        assert!(appear.is_playing_forward());
        assert_eq!(appear.phase(), FadePhase::Appearing);

        let invisible = FadeTransition::activated(&curve, OnEnableBehavior::StartInvisible);
        assert_eq!(invisible.phase(), FadePhase::Hidden);

        let visible = FadeTransition::activated(&curve, OnEnableBehavior::StartVisible);
        assert_eq!(visible.current_second(), 3.0);
        assert_eq!(visible.phase(), FadePhase::Visible);

        let deferred = FadeTransition::activated(&curve, OnEnableBehavior::AppearAfterExternalSignal);
        assert_eq!(deferred.phase(), FadePhase::Hidden);
    }

    #[test]
    fn appear_reaches_end_and_fires_once() {
        let mut transition =
            FadeTransition::activated(&FadeCurve::default(), OnEnableBehavior::PlayAppear);
        let events = run(&mut transition, 4.0);

        assert_eq!(events, vec![TransitionEvent::AppearFinished]);
        assert_eq!(transition.current_second(), transition.end_second());
        assert!(!transition.is_animating());
    }

    #[test]
    fn disappear_decreases_monotonically_and_fires_once() {
        let mut transition =
            FadeTransition::activated(&FadeCurve::default(), OnEnableBehavior::StartVisible);
        transition.play_disappear();

        let mut previous = transition.current_second();
        let mut events = Vec::new();
        for _ in 0..300 {
            events.extend(transition.tick(FRAME));
            assert!(transition.current_second() <= previous);
            previous = transition.current_second();
        }

        assert_eq!(events, vec![TransitionEvent::DisappearFinished]);
        assert_eq!(transition.current_second(), transition.begin_second());
        assert_eq!(transition.phase(), FadePhase::Hidden);
    }

    #[test]
    fn disappear_interrupts_appear() {
        let mut transition =
            FadeTransition::activated(&FadeCurve::default(), OnEnableBehavior::PlayAppear);
        run(&mut transition, 1.0);
        let midway = transition.current_second();
        assert!(midway > 0.9 && midway < 1.1);

        transition.play_disappear();
        assert_eq!(transition.phase(), FadePhase::Disappearing);
        let events = run(&mut transition, 2.0);
        assert_eq!(events, vec![TransitionEvent::DisappearFinished]);
    }

    #[test]
    fn uninterruptible_disappear_at_begin_finishes_synchronously() {
        let mut transition =
            FadeTransition::activated(&FadeCurve::default(), OnEnableBehavior::StartInvisible);

        assert_eq!(
            transition.play_uninterruptible_disappear(),
            Some(TransitionEvent::UninterruptibleDisappearFinished)
        );
        assert!(!transition.is_playing_uninterruptible_disappear());
        assert_eq!(run(&mut transition, 1.0), Vec::new());
    }

    #[test]
    fn uninterruptible_disappear_at_begin_keeps_an_appear_going() {
        let mut transition =
            FadeTransition::activated(&FadeCurve::default(), OnEnableBehavior::PlayAppear);

        assert_eq!(
            transition.play_uninterruptible_disappear(),
            Some(TransitionEvent::UninterruptibleDisappearFinished)
        );
        assert!(transition.is_playing_forward());
        assert!(!transition.is_playing_uninterruptible_disappear());
        assert_eq!(run(&mut transition, 4.0), vec![TransitionEvent::AppearFinished]);
    }

    #[test]
    fn uninterruptible_disappear_locks_out_appear() {
        let mut transition =
            FadeTransition::activated(&FadeCurve::default(), OnEnableBehavior::StartVisible);
        assert_eq!(transition.play_uninterruptible_disappear(), None);
        assert!(transition.is_playing_uninterruptible_disappear());

        run(&mut transition, 1.0);
        transition.play_appear();
        transition.toggle();
        assert!(!transition.is_playing_forward());

        let events = run(&mut transition, 3.0);
        assert_eq!(events, vec![TransitionEvent::UninterruptibleDisappearFinished]);
        assert!(!transition.is_playing_uninterruptible_disappear());

        transition.play_appear();
        assert!(transition.is_playing_forward());
    }

    #[test]
    fn resting_on_a_bound_fires_nothing() {
        let mut transition =
            FadeTransition::activated(&FadeCurve::default(), OnEnableBehavior::StartVisible);
        transition.play_appear();
        assert_eq!(run(&mut transition, 1.0), Vec::new());

        transition.reset();
        transition.play_disappear();
        assert_eq!(run(&mut transition, 1.0), Vec::new());
    }

    #[test]
    fn reset_snaps_hidden_and_clears_lock() {
        let mut transition =
            FadeTransition::activated(&FadeCurve::default(), OnEnableBehavior::StartVisible);
        transition.play_uninterruptible_disappear();
        run(&mut transition, 0.5);

        transition.reset();
        assert_eq!(transition.phase(), FadePhase::Hidden);
        assert_eq!(transition.current_second(), transition.begin_second());
        assert!(!transition.is_playing_uninterruptible_disappear());
    }

    #[test]
    fn toggle_flips_direction() {
        let mut transition =
            FadeTransition::activated(&FadeCurve::default(), OnEnableBehavior::StartInvisible);
        transition.toggle();
        assert!(transition.is_playing_forward());
        transition.toggle();
        assert!(!transition.is_playing_forward());
    }

    #[test]
    fn negative_key_times_extend_the_span() {
        let curve = FadeCurve::new([Keyframe::new(-1.0, 0.0), Keyframe::new(2.0, 1.0)]).unwrap();
        let mut transition = FadeTransition::activated(&curve, OnEnableBehavior::PlayAppear);
        assert_eq!(transition.begin_second(), -1.0);
        assert_eq!(transition.duration(), 3.0);

        let events = run(&mut transition, 3.5);
        assert_eq!(events, vec![TransitionEvent::AppearFinished]);
        assert_eq!(transition.current_second(), 2.0);
    }

    #[test]
    fn span_sync_clamps_the_clock() {
        let mut transition =
            FadeTransition::activated(&FadeCurve::default(), OnEnableBehavior::StartVisible);
        let shorter = FadeCurve::ease_in_out(0.0, 0.0, 1.0, 1.0).unwrap();

        transition.sync_span(&shorter);
        assert_eq!(transition.end_second(), 1.0);
        assert_eq!(transition.current_second(), 1.0);
        assert_eq!(transition.phase(), FadePhase::Visible);
    }

    #[test]
    fn inverted_span_is_ignored() {
        let mut transition =
            FadeTransition::activated(&FadeCurve::default(), OnEnableBehavior::StartVisible);
        // Reflection edits bypass `FadeCurve::new`
        let mut edited = FadeCurve::default();
        *edited
            .get_field_mut::<Vec<Keyframe>>("keys")
            .expect("curve has keys") = vec![Keyframe::new(0.0, 0.0), Keyframe::new(-2.0, 1.0)];
        assert!(edited.validate().is_err());

        transition.sync_span(&edited);
        assert_eq!(transition.begin_second(), 0.0);
        assert_eq!(transition.end_second(), 3.0);
        assert_eq!(transition.current_second(), 3.0);
    }
}

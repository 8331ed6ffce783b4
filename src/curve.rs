//! Keyframed animation curve that maps animation time to an effect ratio.
//!
//! Segments between keyframes are cubic Hermite splines. Outside the keyed range the curve holds
//! the boundary value, so the appear/disappear animation can be scrubbed anywhere on the timeline.

use bevy::math::curve::Curve;
use bevy::math::curve::Interval;
use bevy::prelude::*;

use crate::error::FadeConfigError;

/// A single `(time, value)` key with Hermite tangents (value units per second).
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub time:        f32,
    pub value:       f32,
    pub in_tangent:  f32,
    pub out_tangent: f32,
}

impl Keyframe {
    /// Key with flat tangents, giving an ease in and out of the key.
    pub const fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }

    pub const fn with_tangents(mut self, in_tangent: f32, out_tangent: f32) -> Self {
        self.in_tangent = in_tangent;
        self.out_tangent = out_tangent;
        self
    }

    fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.value.is_finite()
            && self.in_tangent.is_finite()
            && self.out_tangent.is_finite()
    }
}

/// Piecewise cubic curve over strictly increasing keyframe times.
///
/// `begin()` is `min(0, first key time)` so animations always start at zero unless keys with
/// negative times are present; `end()` is the last key time. Sampled values are not clamped by
/// the [`Curve`] impl; use [`FadeCurve::evaluate`] for the `[0, 1]` effect ratio.
#[derive(Reflect, Debug, Clone, PartialEq)]
pub struct FadeCurve {
    keys: Vec<Keyframe>,
}

impl Default for FadeCurve {
    fn default() -> Self {
        Self {
            keys: vec![Keyframe::new(0.0, 0.0), Keyframe::new(3.0, 1.0)],
        }
    }
}

impl FadeCurve {
    pub fn new(keys: impl Into<Vec<Keyframe>>) -> Result<Self, FadeConfigError> {
        let curve = Self { keys: keys.into() };
        curve.validate()?;
        Ok(curve)
    }

    /// Checks that keys exist, are finite and have strictly increasing times.
    pub fn validate(&self) -> Result<(), FadeConfigError> {
        if self.keys.is_empty() {
            return Err(FadeConfigError::EmptyCurve);
        }
        for (index, pair) in self.keys.windows(2).enumerate() {
            if pair[1].time <= pair[0].time {
                return Err(FadeConfigError::UnsortedKeyframes {
                    index:    index + 1,
                    previous: pair[0].time,
                    time:     pair[1].time,
                });
            }
        }
        match self.keys.iter().position(|key| !key.is_finite()) {
            Some(index) => Err(FadeConfigError::NonFiniteKeyframe { index }),
            None => Ok(()),
        }
    }

    /// Straight line between two keys.
    pub fn linear(
        start_time: f32,
        start_value: f32,
        end_time: f32,
        end_value: f32,
    ) -> Result<Self, FadeConfigError> {
        let slope = (end_value - start_value) / (end_time - start_time);
        Self::new([
            Keyframe::new(start_time, start_value).with_tangents(slope, slope),
            Keyframe::new(end_time, end_value).with_tangents(slope, slope),
        ])
    }

    /// Smoothstep-shaped ease between two keys (flat tangents at both ends).
    pub fn ease_in_out(
        start_time: f32,
        start_value: f32,
        end_time: f32,
        end_value: f32,
    ) -> Result<Self, FadeConfigError> {
        Self::new([
            Keyframe::new(start_time, start_value),
            Keyframe::new(end_time, end_value),
        ])
    }

    pub fn keys(&self) -> &[Keyframe] { &self.keys }

    pub fn begin(&self) -> f32 { self.first().time.min(0.0) }

    pub fn end(&self) -> f32 { self.last().time }

    pub fn duration(&self) -> f32 { self.end() - self.begin() }

    /// Effect ratio at `time`, clamped to `[0, 1]`.
    pub fn evaluate(&self, time: f32) -> f32 { self.sample_unchecked(time).clamp(0.0, 1.0) }

    // Reflection can empty the keys after validation; an empty curve reads as a flat zero.
    fn first(&self) -> Keyframe { self.keys.first().copied().unwrap_or(EMPTY_KEY) }

    fn last(&self) -> Keyframe { self.keys.last().copied().unwrap_or(EMPTY_KEY) }
}

const EMPTY_KEY: Keyframe = Keyframe::new(0.0, 0.0);

impl Curve<f32> for FadeCurve {
    fn domain(&self) -> Interval { Interval::EVERYWHERE }

    fn sample_unchecked(&self, t: f32) -> f32 {
        let first = self.first();
        let last = self.last();
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after `t`; the guards above keep it in 1..len
        let next = self.keys.partition_point(|key| key.time <= t);
        hermite(&self.keys[next - 1], &self.keys[next], t)
    }
}

fn hermite(from: &Keyframe, to: &Keyframe, t: f32) -> f32 {
    let span = to.time - from.time;
    let s = (t - from.time) / span;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    h00 * from.value
        + h10 * span * from.out_tangent
        + h01 * to.value
        + h11 * span * to.in_tangent
}

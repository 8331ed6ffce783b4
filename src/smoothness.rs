//! Critically damped smoothing for values that must not visibly pop when their target jumps.

/// Angular frequency multiplier: `omega = SETTLE_RATE / settle_seconds`.
///
/// From rest, a critically damped spring has residual `(1 + omega * t) * exp(-omega * t)`;
/// at `t = settle_seconds` this is `8 * exp(-7)`, about 0.7% of the initial offset.
pub const SETTLE_RATE: f32 = 7.0;

/// Moves `current` toward `target` along a critically damped spring and returns the new value.
///
/// `velocity` carries the spring state between calls and is updated in place. The step uses the
/// closed-form solution for a constant target over `dt`, so it is stable for any frame length.
/// A non-positive `settle_seconds` snaps to the target; a non-positive `dt` leaves everything
/// unchanged.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    settle_seconds: f32,
    dt: f32,
) -> f32 {
    if settle_seconds <= 0.0 {
        *velocity = 0.0;
        return target;
    }
    if dt <= 0.0 {
        return current;
    }

    let omega = SETTLE_RATE / settle_seconds;
    let offset = current - target;
    let decay = (-omega * dt).exp();
    let drift = (*velocity + omega * offset) * dt;

    let mut next = target + (offset + drift) * decay;
    *velocity = (*velocity - omega * drift) * decay;

    // A carried-over velocity can still swing past a target that jumped toward it
    if (target - current > 0.0) == (next > target) {
        next = target;
        *velocity = 0.0;
    }

    next
}

use serde::{Deserialize, Serialize};

use crate::core::error::TimingError;
use crate::core::frame::{FrameDeltas, UpdateKind};

/// Smallest positive `f32` (the first subnormal).
/// A tick duration must be strictly greater than this.
pub const TICK_EPSILON: f32 = f32::from_bits(1);

/// Floor applied by [`TimingConfig::set_tick_duration`]: twice [`TICK_EPSILON`].
pub const MIN_TICK_DURATION: f32 = f32::from_bits(2);

/// Fixed-interval tick accumulator.
///
/// Feed it variable frame deltas with [`advance`](Self::advance); it returns how many
/// whole ticks of `tick_duration` fit into the time seen so far and carries the
/// remainder into the next call.
///
/// Mutation needs `&mut self`, so a single driver owns each accumulator. Hosts with
/// two loops (variable rate and fixed rate) keep one accumulator per loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Length of one tick, in the caller's time unit.
    tick_duration: f32,
    /// Time accumulated since the last whole tick was consumed.
    elapsed: f32,
}

impl TimingConfig {
    /// One tick per time unit.
    pub const ONE: TimingConfig = TimingConfig {
        tick_duration: 1.0,
        elapsed: 0.0,
    };

    /// Create an accumulator with the given tick duration and nothing elapsed.
    ///
    /// Rejects durations that are not strictly greater than [`TICK_EPSILON`],
    /// including NaN.
    pub fn new(tick_duration: f32) -> Result<Self, TimingError> {
        if !is_valid_duration(tick_duration) {
            return Err(TimingError::InvalidTickDuration { tick_duration });
        }
        Ok(Self {
            tick_duration,
            elapsed: 0.0,
        })
    }

    pub fn tick_duration(&self) -> f32 {
        self.tick_duration
    }

    /// Reconfigure the tick duration at runtime.
    ///
    /// Never fails: values below [`MIN_TICK_DURATION`] (and NaN) are floored to it.
    /// The current remainder is kept as is and the new duration applies from the
    /// next [`advance`](Self::advance).
    pub fn set_tick_duration(&mut self, value: f32) {
        // f32::max returns the non-NaN operand.
        let clamped = value.max(MIN_TICK_DURATION);
        if clamped != value {
            log::warn!("tick duration {} floored to {:e}", value, clamped);
        }
        self.tick_duration = clamped;
    }

    /// Time accumulated towards the next tick.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Add `delta` to the accumulator. Returns the number of whole ticks it completed.
    ///
    /// Non-positive and NaN deltas are a no-op returning 0. A remainder landing
    /// exactly on the duration counts as one tick and leaves nothing elapsed.
    /// There is no catch-up cap, but the count saturates at `u64::MAX`; time beyond
    /// that in a single call is dropped.
    ///
    /// A negative carried remainder (only reachable through deserialized data) is
    /// kept and paid back by later deltas before any tick counts.
    pub fn advance(&mut self, delta: f32) -> Result<u64, TimingError> {
        // Deserialized configs skip validation, so check again before touching state.
        if !is_valid_duration(self.tick_duration) {
            return Err(TimingError::InvalidTickDuration {
                tick_duration: self.tick_duration,
            });
        }
        if !(delta > 0.0) {
            return Ok(0);
        }

        let total = self.elapsed + delta;
        if !total.is_finite() {
            log::warn!(
                "ignoring delta {} (elapsed {} would become non-finite)",
                delta,
                self.elapsed
            );
            return Ok(0);
        }
        if total <= 0.0 {
            self.elapsed = total;
            return Ok(0);
        }

        // `%` on floats is exact, so the remainder never drifts from repeated subtraction.
        let remainder = total % self.tick_duration;
        let ticks = ((total - remainder) / self.tick_duration).round();
        if ticks >= u64::MAX as f32 {
            log::warn!(
                "tick count {} for delta {} saturates at u64::MAX",
                ticks,
                delta
            );
        }
        self.elapsed = remainder;

        Ok(ticks as u64)
    }

    /// Advance with the delta a host frame provides for `kind`.
    pub fn advance_frame(
        &mut self,
        deltas: &FrameDeltas,
        kind: UpdateKind,
        unscaled: bool,
    ) -> Result<u64, TimingError> {
        self.advance(deltas.select(kind, unscaled))
    }

    /// Drop the accumulated remainder. The tick duration is untouched.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::ONE
    }
}

fn is_valid_duration(tick_duration: f32) -> bool {
    tick_duration > TICK_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_starts_with_nothing_elapsed() {
        let timing = TimingConfig::new(0.25).unwrap();
        assert_eq!(timing.tick_duration(), 0.25);
        assert_eq!(timing.elapsed(), 0.0);
    }

    #[test]
    fn default_is_one_unit() {
        assert_eq!(TimingConfig::default().tick_duration(), 1.0);
        assert_eq!(TimingConfig::default(), TimingConfig::ONE);
    }

    #[test]
    fn new_rejects_zero_negative_and_nan() {
        for bad in [0.0, -0.0, -1.0, TICK_EPSILON, f32::NEG_INFINITY] {
            assert_eq!(
                TimingConfig::new(bad),
                Err(TimingError::InvalidTickDuration { tick_duration: bad })
            );
        }
        let err = TimingConfig::new(f32::NAN).unwrap_err();
        assert!(err.tick_duration().is_nan());
    }

    #[test]
    fn new_accepts_smallest_valid_duration() {
        let timing = TimingConfig::new(MIN_TICK_DURATION).unwrap();
        assert_eq!(timing.tick_duration(), MIN_TICK_DURATION);
    }

    #[test]
    fn setter_floors_instead_of_failing() {
        let mut timing = TimingConfig::ONE;
        timing.set_tick_duration(-3.0);
        assert_eq!(timing.tick_duration(), MIN_TICK_DURATION);

        timing.set_tick_duration(f32::NAN);
        assert_eq!(timing.tick_duration(), MIN_TICK_DURATION);

        timing.set_tick_duration(0.5);
        assert_eq!(timing.tick_duration(), 0.5);
    }

    #[test]
    fn setter_keeps_remainder() {
        let mut timing = TimingConfig::new(1.0).unwrap();
        timing.advance(0.75).unwrap();
        timing.set_tick_duration(0.5);
        assert_eq!(timing.elapsed(), 0.75);
        // 0.75 + 0.5 = 1.25 -> two ticks of 0.5, 0.25 left
        assert_eq!(timing.advance(0.5).unwrap(), 2);
        assert_eq!(timing.elapsed(), 0.25);
    }

    #[test]
    fn accumulates_partial() {
        let mut timing = TimingConfig::new(1.0).unwrap();
        assert_eq!(timing.advance(0.5).unwrap(), 0);
        assert_eq!(timing.elapsed(), 0.5);
    }

    #[test]
    fn exact_boundary_is_one_tick() {
        let mut timing = TimingConfig::new(1.0).unwrap();
        timing.advance(0.5).unwrap();
        assert_eq!(timing.advance(0.5).unwrap(), 1);
        assert_eq!(timing.elapsed(), 0.0);
    }

    #[test]
    fn several_ticks_in_one_call() {
        let mut timing = TimingConfig::new(2.0).unwrap();
        assert_eq!(timing.advance(5.0).unwrap(), 2);
        assert_eq!(timing.elapsed(), 1.0);
    }

    #[test]
    fn no_catch_up_cap() {
        let mut timing = TimingConfig::new(0.5).unwrap();
        assert_eq!(timing.advance(1_000_000.0).unwrap(), 2_000_000);
        assert_eq!(timing.elapsed(), 0.0);
    }

    #[test]
    fn tiny_duration_with_huge_delta_terminates() {
        let mut timing = TimingConfig::new(1.0e-6).unwrap();
        let ticks = timing.advance(1.0e6).unwrap();
        assert!(ticks > 900_000_000_000, "ticks was {}", ticks);
        assert!(timing.elapsed() < 1.0e-6);
    }

    #[test]
    fn non_positive_delta_is_noop() {
        let mut timing = TimingConfig::new(1.0).unwrap();
        timing.advance(0.3).unwrap();
        for delta in [0.0, -0.0, -1.0, f32::NEG_INFINITY, f32::NAN] {
            assert_eq!(timing.advance(delta).unwrap(), 0);
            assert_eq!(timing.elapsed(), 0.3);
        }
    }

    #[test]
    fn infinite_delta_is_ignored() {
        let mut timing = TimingConfig::new(1.0).unwrap();
        timing.advance(0.25).unwrap();
        assert_eq!(timing.advance(f32::INFINITY).unwrap(), 0);
        assert_eq!(timing.elapsed(), 0.25);
    }

    #[test]
    fn reset_clears_elapsed_only() {
        let mut timing = TimingConfig::new(2.0).unwrap();
        timing.advance(1.5).unwrap();
        timing.reset();
        assert_eq!(timing.elapsed(), 0.0);
        assert_eq!(timing.tick_duration(), 2.0);
    }

    #[test]
    fn copies_are_independent() {
        let mut a = TimingConfig::new(1.0).unwrap();
        a.advance(0.5).unwrap();
        let mut b = a;
        b.advance(0.25).unwrap();
        assert_eq!(a.elapsed(), 0.5);
        assert_eq!(b.elapsed(), 0.75);
    }

    #[test]
    fn corrupted_duration_fails_without_mutation() {
        let mut timing: TimingConfig =
            serde_json::from_str(r#"{ "tick_duration": 0.0, "elapsed": 0.5 }"#).unwrap();
        assert_eq!(
            timing.advance(1.0),
            Err(TimingError::InvalidTickDuration { tick_duration: 0.0 })
        );
        assert_eq!(timing.elapsed(), 0.5);
    }

    #[test]
    fn negative_carried_remainder_is_paid_back() {
        let mut timing: TimingConfig =
            serde_json::from_str(r#"{ "tick_duration": 1.0, "elapsed": -3.5 }"#).unwrap();
        assert_eq!(timing.advance(1.0).unwrap(), 0);
        assert_eq!(timing.elapsed(), -2.5);
        assert_eq!(timing.advance(1.0).unwrap(), 0);
        assert_eq!(timing.elapsed(), -1.5);

        // Crosses zero: back to the normal remainder range.
        assert_eq!(timing.advance(2.0).unwrap(), 0);
        assert_eq!(timing.elapsed(), 0.5);
        assert_eq!(timing.advance(1.0).unwrap(), 1);
        assert_eq!(timing.elapsed(), 0.5);
    }

    #[test]
    fn tick_count_saturates() {
        let mut timing = TimingConfig::new(MIN_TICK_DURATION).unwrap();
        assert_eq!(timing.advance(1.0e30).unwrap(), u64::MAX);
        assert!(timing.elapsed() >= 0.0);
        assert!(timing.elapsed() < MIN_TICK_DURATION);
    }

    #[test]
    fn advance_frame_uses_selected_source() {
        let deltas = FrameDeltas {
            delta: 0.5,
            unscaled_delta: 1.0,
            fixed_delta: 2.0,
            fixed_unscaled_delta: 4.0,
        };
        let mut timing = TimingConfig::new(1.0).unwrap();
        assert_eq!(timing.advance_frame(&deltas, UpdateKind::Variable, false).unwrap(), 0);
        assert_eq!(timing.advance_frame(&deltas, UpdateKind::Fixed, true).unwrap(), 4);
        assert_eq!(timing.elapsed(), 0.5);
    }

    proptest! {
        /// Property: zero deltas never change state
        #[test]
        fn prop_zero_delta_idempotent(duration in 0.01f32..10.0f32, start in 0.0f32..1.0f32) {
            let mut timing = TimingConfig::new(duration).unwrap();
            timing.advance(start * duration).unwrap();
            let before = timing;
            for _ in 0..8 {
                prop_assert_eq!(timing.advance(0.0).unwrap(), 0);
            }
            prop_assert_eq!(timing, before);
        }

        /// Property: ticks plus remainder account for every delta fed in
        #[test]
        fn prop_ticks_match_total_time(
            duration in 0.05f32..2.0f32,
            deltas in proptest::collection::vec(0.0f32..1.0f32, 1..64)
        ) {
            let mut timing = TimingConfig::new(duration).unwrap();
            let mut ticks = 0u64;
            for delta in &deltas {
                ticks += timing.advance(*delta).unwrap();
                prop_assert!(timing.elapsed() >= 0.0);
                prop_assert!(timing.elapsed() < duration);
            }
            let sum: f64 = deltas.iter().map(|d| *d as f64).sum();
            let expected = (sum / duration as f64).floor() as i64;
            prop_assert!((ticks as i64 - expected).abs() <= 1,
                "ticks {} expected {}", ticks, expected);
            let accounted = ticks as f64 * duration as f64 + timing.elapsed() as f64;
            prop_assert!((accounted - sum).abs() < 1e-3, "accounted {} sum {}", accounted, sum);
        }

        /// Property: with exactly representable inputs the count is exact
        #[test]
        fn prop_exact_inputs_exact_ticks(quarters in proptest::collection::vec(0u32..16, 1..64)) {
            let mut timing = TimingConfig::new(0.5).unwrap();
            let mut ticks = 0u64;
            for q in &quarters {
                ticks += timing.advance(*q as f32 * 0.25).unwrap();
            }
            let total: u32 = quarters.iter().sum();
            prop_assert_eq!(ticks, (total / 2) as u64);
            prop_assert_eq!(timing.elapsed(), (total % 2) as f32 * 0.25);
        }
    }
}

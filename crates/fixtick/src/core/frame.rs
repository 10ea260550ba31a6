use serde::{Deserialize, Serialize};

/// Which host callback is driving the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateKind {
    /// Once per rendered frame, variable delta.
    Variable,
    /// Once per physics step, fixed delta.
    Fixed,
}

/// One sample of the host's time sources.
///
/// Scaled deltas follow the host's time scale (slow motion, pause);
/// unscaled deltas are wall-clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDeltas {
    pub delta: f32,
    pub unscaled_delta: f32,
    pub fixed_delta: f32,
    pub fixed_unscaled_delta: f32,
}

impl FrameDeltas {
    /// A variable-rate frame from a host without time scaling.
    pub fn variable(dt: f32) -> Self {
        Self {
            delta: dt,
            unscaled_delta: dt,
            ..Self::default()
        }
    }

    /// A fixed-rate step from a host without time scaling.
    pub fn fixed(dt: f32) -> Self {
        Self {
            fixed_delta: dt,
            fixed_unscaled_delta: dt,
            ..Self::default()
        }
    }

    /// Pick the delta matching the update kind and time scaling.
    pub fn select(&self, kind: UpdateKind, unscaled: bool) -> f32 {
        match (kind, unscaled) {
            (UpdateKind::Variable, false) => self.delta,
            (UpdateKind::Variable, true) => self.unscaled_delta,
            (UpdateKind::Fixed, false) => self.fixed_delta,
            (UpdateKind::Fixed, true) => self.fixed_unscaled_delta,
        }
    }
}

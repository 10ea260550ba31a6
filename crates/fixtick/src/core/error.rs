use thiserror::Error;

/// Errors raised by the tick accumulator.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TimingError {
    /// The tick duration is zero, negative, NaN, or too close to zero.
    #[error("tick duration can't be close to zero, zero or negative (got {tick_duration})")]
    InvalidTickDuration { tick_duration: f32 },
}

impl TimingError {
    /// The offending tick duration carried by the error.
    pub fn tick_duration(&self) -> f32 {
        match self {
            TimingError::InvalidTickDuration { tick_duration } => *tick_duration,
        }
    }
}

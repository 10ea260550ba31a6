pub mod api;
pub mod core;

// Re-export key types at crate root for convenience
pub use crate::api::clock::{ClockController, TickListener};
pub use crate::api::config::{ClockConfig, ConfigError};
pub use crate::core::error::TimingError;
pub use crate::core::frame::{FrameDeltas, UpdateKind};
pub use crate::core::timing::{TimingConfig, MIN_TICK_DURATION, TICK_EPSILON};

use crate::api::config::ClockConfig;
use crate::core::error::TimingError;
use crate::core::frame::{FrameDeltas, UpdateKind};
use crate::core::timing::TimingConfig;

/// Receives one notification per completed tick.
pub trait TickListener {
    fn on_tick(&mut self);
}

impl<F: FnMut()> TickListener for F {
    fn on_tick(&mut self) {
        self()
    }
}

/// Host-facing clock: owns a [`TimingConfig`], picks the delta for the current
/// host callback and fires every listener once per tick.
///
/// The host calls [`update`](Self::update) from its per-frame callback and
/// [`fixed_update`](Self::fixed_update) from its fixed-rate callback. Only the one
/// matching `use_fixed_update` advances the clock.
pub struct ClockController {
    timing: TimingConfig,
    running: bool,
    use_fixed_update: bool,
    unscaled_time: bool,
    listeners: Vec<Box<dyn TickListener>>,
    total_ticks: u64,
}

impl ClockController {
    pub fn new(config: ClockConfig) -> Result<Self, TimingError> {
        config.validate()?;
        Ok(Self {
            timing: config.timing,
            running: config.running,
            use_fixed_update: config.use_fixed_update,
            unscaled_time: config.unscaled_time,
            listeners: Vec::new(),
            total_ticks: 0,
        })
    }

    /// Register a listener. Listeners fire in registration order.
    pub fn add_listener(&mut self, listener: impl TickListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn tick_duration(&self) -> f32 {
        self.timing.tick_duration()
    }

    /// Live reconfiguration. Clamps instead of failing.
    pub fn set_tick_duration(&mut self, value: f32) {
        self.timing.set_tick_duration(value);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start or stop the clock. A change of state drops the carried remainder.
    pub fn set_running(&mut self, running: bool) {
        if self.running != running {
            self.timing.reset();
            self.running = running;
            log::debug!("clock {}", if running { "started" } else { "stopped" });
        }
    }

    pub fn uses_fixed_update(&self) -> bool {
        self.use_fixed_update
    }

    pub fn set_use_fixed_update(&mut self, value: bool) {
        self.use_fixed_update = value;
    }

    pub fn uses_unscaled_time(&self) -> bool {
        self.unscaled_time
    }

    pub fn set_unscaled_time(&mut self, value: bool) {
        self.unscaled_time = value;
    }

    /// Read-only view of the accumulator.
    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    /// Ticks dispatched since construction (wraps on overflow).
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn reset(&mut self) {
        self.timing.reset();
    }

    /// Per-frame callback. Returns the number of ticks dispatched.
    pub fn update(&mut self, deltas: &FrameDeltas) -> Result<u64, TimingError> {
        if !self.running || self.use_fixed_update {
            return Ok(0);
        }
        self.proceed(deltas, UpdateKind::Variable)
    }

    /// Fixed-rate callback. Returns the number of ticks dispatched.
    pub fn fixed_update(&mut self, deltas: &FrameDeltas) -> Result<u64, TimingError> {
        if !self.running || !self.use_fixed_update {
            return Ok(0);
        }
        self.proceed(deltas, UpdateKind::Fixed)
    }

    fn proceed(&mut self, deltas: &FrameDeltas, kind: UpdateKind) -> Result<u64, TimingError> {
        let ticks = self.timing.advance_frame(deltas, kind, self.unscaled_time)?;
        if ticks > 0 {
            log::trace!("{:?} update: dispatching {} ticks", kind, ticks);
        }
        for _ in 0..ticks {
            for listener in self.listeners.iter_mut() {
                listener.on_tick();
            }
        }
        self.total_ticks = self.total_ticks.wrapping_add(ticks);
        Ok(ticks)
    }
}

use fixtick::{ClockConfig, ClockController, FrameDeltas, TickListener, TimingError};

/// Clock runner driven by the browser frame loop.
///
/// JavaScript calls [`tick`](Self::tick) from `requestAnimationFrame` and, when it
/// runs a fixed-rate loop, [`fixed_tick`](Self::fixed_tick). Ticks are both
/// dispatched to registered listeners and counted in `pending_ticks` so JS can poll
/// them once per frame.
pub struct ClockRunner {
    clock: ClockController,
    pending_ticks: u64,
    last_error: Option<TimingError>,
}

impl ClockRunner {
    pub fn new(config: ClockConfig) -> Result<Self, TimingError> {
        Ok(Self {
            clock: ClockController::new(config)?,
            pending_ticks: 0,
            last_error: None,
        })
    }

    pub fn add_listener(&mut self, listener: impl TickListener + 'static) {
        self.clock.add_listener(listener);
    }

    /// Per-frame tick. `dt` is time-scaled, `unscaled_dt` is wall-clock.
    pub fn tick(&mut self, dt: f32, unscaled_dt: f32) -> u32 {
        let deltas = FrameDeltas {
            delta: dt,
            unscaled_delta: unscaled_dt,
            ..FrameDeltas::default()
        };
        let result = self.clock.update(&deltas);
        self.record(result)
    }

    /// Fixed-rate tick.
    pub fn fixed_tick(&mut self, dt: f32, unscaled_dt: f32) -> u32 {
        let deltas = FrameDeltas {
            fixed_delta: dt,
            fixed_unscaled_delta: unscaled_dt,
            ..FrameDeltas::default()
        };
        let result = self.clock.fixed_update(&deltas);
        self.record(result)
    }

    fn record(&mut self, result: Result<u64, TimingError>) -> u32 {
        match result {
            Ok(ticks) => {
                self.last_error = None;
                self.pending_ticks = self.pending_ticks.saturating_add(ticks);
                // JS numbers lose precision past u32 anyway.
                ticks.min(u32::MAX as u64) as u32
            }
            Err(err) => {
                log::error!("clock tick failed: {}", err);
                self.last_error = Some(err);
                0
            }
        }
    }

    /// Ticks accumulated since the last drain.
    pub fn pending_ticks(&self) -> u32 {
        self.pending_ticks.min(u32::MAX as u64) as u32
    }

    /// Return and clear the pending tick count.
    pub fn drain_ticks(&mut self) -> u32 {
        let ticks = self.pending_ticks();
        self.pending_ticks = 0;
        ticks
    }

    /// Error from the most recent tick, cleared by the next successful one.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.map(|err| err.to_string())
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn set_running(&mut self, running: bool) {
        self.clock.set_running(running);
    }

    pub fn set_use_fixed_update(&mut self, value: bool) {
        self.clock.set_use_fixed_update(value);
    }

    pub fn set_unscaled_time(&mut self, value: bool) {
        self.clock.set_unscaled_time(value);
    }

    pub fn tick_duration(&self) -> f32 {
        self.clock.tick_duration()
    }

    pub fn set_tick_duration(&mut self, value: f32) {
        self.clock.set_tick_duration(value);
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.timing().elapsed()
    }

    pub fn reset(&mut self) {
        self.clock.reset();
        self.pending_ticks = 0;
    }
}

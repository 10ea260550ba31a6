pub mod runner;

pub use runner::ClockRunner;

use std::cell::RefCell;

use fixtick::ClockConfig;
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<ClockRunner>> = RefCell::new(None);
    static ON_TICK: RefCell<Vec<js_sys::Function>> = RefCell::new(Vec::new());
}

fn with_runner<R>(f: impl FnOnce(&mut ClockRunner) -> R) -> R {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let runner = borrow
            .as_mut()
            .expect("Clock not initialized. Call clock_init() first.");
        f(runner)
    })
}

/// Step the runner, then call `fire` once per tick after the runner borrow is released,
/// so tick callbacks may call back into the clock.
fn tick_then_fire(step: impl FnOnce(&mut ClockRunner) -> u32, mut fire: impl FnMut()) -> u32 {
    let ticks = with_runner(step);
    for _ in 0..ticks {
        fire();
    }
    ticks
}

fn fire_js_callbacks() {
    // Snapshot so a callback may register further callbacks.
    let callbacks = ON_TICK.with(|cell| cell.borrow().clone());
    for callback in &callbacks {
        if let Err(err) = callback.call0(&JsValue::NULL) {
            log::error!("on_tick callback threw: {:?}", err);
        }
    }
}

fn install(config: ClockConfig) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let runner = ClockRunner::new(config).map_err(|err| JsValue::from_str(&err.to_string()))?;
    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    ON_TICK.with(|cell| cell.borrow_mut().clear());
    log::info!("fixtick: clock initialized");
    Ok(())
}

/// Create the clock with the given tick duration. Throws on a non-positive duration.
#[wasm_bindgen]
pub fn clock_init(tick_duration: f32) -> Result<(), JsValue> {
    let config =
        ClockConfig::with_tick_duration(tick_duration).map_err(|err| JsValue::from_str(&err.to_string()))?;
    install(config)
}

/// Create the clock from a JSON `ClockConfig`.
#[wasm_bindgen]
pub fn clock_init_json(json: &str) -> Result<(), JsValue> {
    let config = ClockConfig::from_json(json).map_err(|err| JsValue::from_str(&err.to_string()))?;
    install(config)
}

/// Register a JS function called once per tick.
/// Callbacks run after the tick is counted and may call any other `clock_*` export.
#[wasm_bindgen]
pub fn clock_set_on_tick(callback: js_sys::Function) {
    ON_TICK.with(|cell| cell.borrow_mut().push(callback));
}

#[wasm_bindgen]
pub fn clock_tick(dt: f32, unscaled_dt: f32) -> u32 {
    tick_then_fire(|r| r.tick(dt, unscaled_dt), fire_js_callbacks)
}

#[wasm_bindgen]
pub fn clock_fixed_tick(dt: f32, unscaled_dt: f32) -> u32 {
    tick_then_fire(|r| r.fixed_tick(dt, unscaled_dt), fire_js_callbacks)
}

#[wasm_bindgen]
pub fn clock_drain_ticks() -> u32 {
    with_runner(|r| r.drain_ticks())
}

#[wasm_bindgen]
pub fn clock_pending_ticks() -> u32 {
    with_runner(|r| r.pending_ticks())
}

#[wasm_bindgen]
pub fn clock_last_error() -> Option<String> {
    with_runner(|r| r.last_error())
}

// ---- Configuration ----

#[wasm_bindgen]
pub fn clock_set_running(running: bool) {
    with_runner(|r| r.set_running(running));
}

#[wasm_bindgen]
pub fn clock_is_running() -> bool {
    with_runner(|r| r.is_running())
}

#[wasm_bindgen]
pub fn clock_set_use_fixed_update(value: bool) {
    with_runner(|r| r.set_use_fixed_update(value));
}

#[wasm_bindgen]
pub fn clock_set_unscaled_time(value: bool) {
    with_runner(|r| r.set_unscaled_time(value));
}

#[wasm_bindgen]
pub fn clock_set_tick_duration(value: f32) {
    with_runner(|r| r.set_tick_duration(value));
}

#[wasm_bindgen]
pub fn clock_tick_duration() -> f32 {
    with_runner(|r| r.tick_duration())
}

#[wasm_bindgen]
pub fn clock_elapsed() -> f32 {
    with_runner(|r| r.elapsed())
}

#[wasm_bindgen]
pub fn clock_reset() {
    with_runner(|r| r.reset());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn install_runner(tick_duration: f32) {
        let config = ClockConfig::with_tick_duration(tick_duration).unwrap();
        RUNNER.with(|cell| {
            *cell.borrow_mut() = Some(ClockRunner::new(config).unwrap());
        });
    }

    #[test]
    fn tick_callbacks_can_reenter_the_clock() {
        install_runner(0.5);
        let mut drained = Vec::new();
        let ticks = tick_then_fire(
            |r| r.tick(1.0, 1.0),
            || drained.push(with_runner(|r| r.drain_ticks())),
        );
        assert_eq!(ticks, 2);
        assert_eq!(drained, vec![2, 0]);
    }

    #[test]
    fn no_ticks_no_callbacks() {
        install_runner(1.0);
        let mut fired = 0;
        assert_eq!(tick_then_fire(|r| r.tick(0.25, 0.25), || fired += 1), 0);
        assert_eq!(fired, 0);
        assert_eq!(with_runner(|r| r.elapsed()), 0.25);
    }
}

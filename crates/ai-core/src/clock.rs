//! Time sources for timestamped bookkeeping (failure-loop blocks, action history).
//!
//! A controller owns exactly one clock and reads it once per tick, so every
//! timestamp written during a tick agrees. Which domain governs blocking is a
//! deployment choice: [`SimClock`] follows the simulation delta (time scaling
//! and pauses apply), [`WallClock`] follows real time.

use std::time::Instant;

pub trait Clock: 'static {
    /// Seconds since the clock's origin.
    fn now(&self) -> f64;

    /// Called by the controller at the start of every tick with the tick delta.
    ///
    /// Clocks that do not follow the simulation ignore this.
    fn advance(&mut self, _dt_seconds: f32) {}
}

/// Simulation-domain clock: accumulates tick deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    elapsed: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(elapsed: f64) -> Self {
        Self { elapsed }
    }
}

impl Clock for SimClock {
    fn now(&self) -> f64 {
        self.elapsed
    }

    fn advance(&mut self, dt_seconds: f32) {
        if dt_seconds.is_finite() && dt_seconds > 0.0 {
            self.elapsed += f64::from(dt_seconds);
        }
    }
}

/// Wall-clock domain: monotonic real time since construction.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Externally driven clock. Clones share the same time cell, so a test can
/// keep a handle and move time independently of tick deltas.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<f64>>,
}

impl ManualClock {
    pub fn new(now: f64) -> Self {
        Self {
            now: std::rc::Rc::new(std::cell::Cell::new(now)),
        }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn add(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

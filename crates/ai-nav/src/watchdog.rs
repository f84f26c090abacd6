//! Movement-stall detection.
//!
//! A watchdog is fed the tick delta only while an action is running and the
//! agent has an active path. It reports a stall by returning a [`StallEvent`]
//! from `update`; the caller handles recovery in the same tick and then calls
//! `start_cooldown`. Nothing is registered, so there is nothing to unregister.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{MovementWorld, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StallEvent {
    pub position: Vec2,
    /// Seconds without progress when the stall fired.
    pub stalled_for: f32,
}

pub trait Watchdog<W>: 'static
where
    W: MovementWorld,
{
    /// Establish the starting baseline for a freshly bound agent.
    fn initialize(&mut self, position: Option<Vec2>);

    fn update(&mut self, world: &W, agent: W::Agent, dt_seconds: f32) -> Option<StallEvent>;

    /// A new action began; progress is measured from here.
    fn on_new_action(&mut self, position: Option<Vec2>);

    /// Suppress stall reports for a while after a recovery.
    fn start_cooldown(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct StuckWatchdogConfig {
    /// Seconds without progress before a stall fires.
    pub stall_seconds: f32,
    /// Movement (or remaining-distance reduction) that counts as progress.
    pub min_progress: f32,
    pub cooldown_seconds: f32,
}

impl Default for StuckWatchdogConfig {
    fn default() -> Self {
        Self {
            stall_seconds: 2.0,
            min_progress: 0.1,
            cooldown_seconds: 1.5,
        }
    }
}

/// Progress-based watchdog: an agent is stuck when it has neither moved
/// `min_progress` from its last anchor nor reduced its remaining path distance
/// by that much for `stall_seconds`.
#[derive(Debug, Clone)]
pub struct StuckWatchdog {
    config: StuckWatchdogConfig,
    anchor: Option<Vec2>,
    best_remaining: f32,
    stalled_for: f32,
    cooldown: f32,
}

impl StuckWatchdog {
    pub fn new(config: StuckWatchdogConfig) -> Self {
        Self {
            config,
            anchor: None,
            best_remaining: f32::INFINITY,
            stalled_for: 0.0,
            cooldown: 0.0,
        }
    }

    pub fn config(&self) -> &StuckWatchdogConfig {
        &self.config
    }

    pub fn stalled_for(&self) -> f32 {
        self.stalled_for
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown
    }

    fn rebase(&mut self, position: Option<Vec2>) {
        self.anchor = position;
        self.best_remaining = f32::INFINITY;
        self.stalled_for = 0.0;
    }
}

impl Default for StuckWatchdog {
    fn default() -> Self {
        Self::new(StuckWatchdogConfig::default())
    }
}

impl<W> Watchdog<W> for StuckWatchdog
where
    W: MovementWorld + 'static,
{
    fn initialize(&mut self, position: Option<Vec2>) {
        self.rebase(position);
        self.cooldown = 0.0;
    }

    fn update(&mut self, world: &W, agent: W::Agent, dt_seconds: f32) -> Option<StallEvent> {
        let dt = if dt_seconds.is_finite() {
            dt_seconds.max(0.0)
        } else {
            0.0
        };

        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
            return None;
        }

        if world.path_pending(agent) {
            self.stalled_for = 0.0;
            return None;
        }

        let position = world.position(agent)?;
        let remaining = world.remaining_distance(agent);

        let moved = match self.anchor {
            Some(anchor) => anchor.distance(position) >= self.config.min_progress,
            None => true,
        };
        let closer = self.best_remaining - remaining >= self.config.min_progress;

        if moved || closer {
            self.anchor = Some(position);
            self.best_remaining = remaining;
            self.stalled_for = 0.0;
            return None;
        }

        self.stalled_for += dt;
        if self.stalled_for < self.config.stall_seconds {
            return None;
        }

        let event = StallEvent {
            position,
            stalled_for: self.stalled_for,
        };
        self.stalled_for = 0.0;
        Some(event)
    }

    fn on_new_action(&mut self, position: Option<Vec2>) {
        self.rebase(position);
    }

    fn start_cooldown(&mut self) {
        self.cooldown = self.config.cooldown_seconds.max(0.0);
        self.stalled_for = 0.0;
    }
}

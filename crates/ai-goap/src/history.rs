use std::collections::BTreeMap;

use ai_core::ActionKey;

/// Per-agent record of when each action last completed and how many times in
/// a row the same action completed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionHistory {
    last_executed: BTreeMap<ActionKey, f64>,
    last_action: Option<ActionKey>,
    consecutive: u32,
}

impl ActionHistory {
    /// Returned by [`time_since_last_execution`](Self::time_since_last_execution)
    /// for an action that never completed.
    pub const NEVER: f64 = f64::INFINITY;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_action_completed(&mut self, key: ActionKey, now: f64) {
        self.last_executed.insert(key, now);
        if self.last_action == Some(key) {
            self.consecutive = self.consecutive.saturating_add(1);
        } else {
            self.last_action = Some(key);
            self.consecutive = 1;
        }
    }

    pub fn time_since_last_execution(&self, key: ActionKey, now: f64) -> f64 {
        match self.last_executed.get(&key) {
            Some(at) => (now - at).max(0.0),
            None => Self::NEVER,
        }
    }

    pub fn was_executed_within(&self, key: ActionKey, seconds: f64, now: f64) -> bool {
        self.time_since_last_execution(key, now) <= seconds
    }

    pub fn last_action(&self) -> Option<ActionKey> {
        self.last_action
    }

    pub fn consecutive_count(&self) -> u32 {
        self.consecutive
    }

    /// The current streak if `key` is the most recent action, else zero.
    pub fn streak_of(&self, key: ActionKey) -> u32 {
        if self.last_action == Some(key) {
            self.consecutive
        } else {
            0
        }
    }

    pub fn clear(&mut self) {
        self.last_executed.clear();
        self.last_action = None;
        self.consecutive = 0;
    }
}

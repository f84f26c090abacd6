use std::collections::BTreeMap;

use ai_core::PlanSignature;

use crate::LoopDetectorConfig;

/// Damps plans that keep failing the same way.
///
/// Failures are counted per [`PlanSignature`]. Once a signature reaches
/// `max_consecutive_failures` it is blocked for `block_duration_seconds`, and
/// its goal is excluded from arbitration while any of its signatures is
/// blocked. Timestamps come from the caller's clock; a block is active while
/// `now < until`.
#[derive(Debug, Clone, Default)]
pub struct FailureLoopDetector {
    config: LoopDetectorConfig,
    failures: BTreeMap<PlanSignature, u32>,
    /// goal name -> signature -> blocked-until
    blocked: BTreeMap<String, BTreeMap<PlanSignature, f64>>,
}

impl FailureLoopDetector {
    pub fn new(config: LoopDetectorConfig) -> Self {
        Self {
            config,
            failures: BTreeMap::new(),
            blocked: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &LoopDetectorConfig {
        &self.config
    }

    pub fn signature_of(goal: &str, actions: &[&str]) -> PlanSignature {
        PlanSignature::new(goal, actions.iter().copied())
    }

    /// Record a failure. Returns `true` when the signature is blocked after
    /// this call. A failure while already blocked never shortens the block.
    pub fn on_plan_failed(&mut self, signature: &PlanSignature, now: f64) -> bool {
        let count = self.failures.entry(signature.clone()).or_insert(0);
        *count = count.saturating_add(1);
        if *count < self.config.max_consecutive_failures {
            return false;
        }

        let until = now + self.config.block_duration_seconds;
        let slot = self
            .blocked
            .entry(signature.goal_name().to_owned())
            .or_default()
            .entry(signature.clone())
            .or_insert(until);
        if *slot < until {
            *slot = until;
        }
        true
    }

    /// Clear the failure count. An active block stays until it expires.
    pub fn on_plan_succeeded(&mut self, signature: &PlanSignature) {
        self.failures.remove(signature);
    }

    pub fn is_goal_blocked(&self, goal: &str, now: f64) -> bool {
        self.blocked
            .get(goal)
            .is_some_and(|sigs| sigs.values().any(|&until| now < until))
    }

    /// Whether `signature` is blocked. An expired block is cleared on the spot.
    pub fn is_plan_blocked(&mut self, signature: &PlanSignature, now: f64) -> bool {
        let goal = signature.goal_name();
        let Some(until) = self.blocked_until(signature) else {
            return false;
        };
        if now < until {
            return true;
        }

        if let Some(sigs) = self.blocked.get_mut(goal) {
            sigs.remove(signature);
            if sigs.is_empty() {
                self.blocked.remove(goal);
            }
        }
        self.failures.remove(signature);
        false
    }

    /// Drop every expired block (and the failure count behind it). Returns the
    /// number of signatures released.
    pub fn purge_expired_blocks(&mut self, now: f64) -> usize {
        let mut released = Vec::new();
        self.blocked.retain(|_, sigs| {
            sigs.retain(|sig, until| {
                let active = now < *until;
                if !active {
                    released.push(sig.clone());
                }
                active
            });
            !sigs.is_empty()
        });
        for sig in &released {
            self.failures.remove(sig);
        }
        released.len()
    }

    pub fn clear(&mut self) {
        self.failures.clear();
        self.blocked.clear();
    }

    pub fn failure_count(&self, signature: &PlanSignature) -> u32 {
        self.failures.get(signature).copied().unwrap_or(0)
    }

    pub fn blocked_until(&self, signature: &PlanSignature) -> Option<f64> {
        self.blocked
            .get(signature.goal_name())?
            .get(signature)
            .copied()
    }

    /// Every signature holding a block entry, expired or not, in order.
    pub fn blocked_signatures(&self) -> impl Iterator<Item = (&PlanSignature, f64)> + '_ {
        self.blocked
            .values()
            .flat_map(|sigs| sigs.iter().map(|(sig, until)| (sig, *until)))
    }
}

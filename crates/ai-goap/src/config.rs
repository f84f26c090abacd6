#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ai_nav::StuckWatchdogConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },

    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[error("failed to parse controller config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct LoopDetectorConfig {
    /// Consecutive failures of one plan signature before it is blocked.
    pub max_consecutive_failures: u32,
    pub block_duration_seconds: f64,
}

impl Default for LoopDetectorConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: 3,
            block_duration_seconds: 30.0,
        }
    }
}

/// Saturating ramp from plan commitment to a priority bonus.
///
/// `bonus(c) = clamp(c / saturation, 0, 1) * max_bonus`, so commitment at or
/// above `saturation` yields the full `max_bonus`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct CommitmentRamp {
    pub saturation: f32,
    pub max_bonus: f32,
}

impl Default for CommitmentRamp {
    fn default() -> Self {
        Self {
            saturation: 1.5,
            max_bonus: 1.0,
        }
    }
}

impl CommitmentRamp {
    pub fn bonus(&self, commitment: f32) -> f32 {
        if !commitment.is_finite() || self.saturation <= 0.0 {
            return 0.0;
        }
        (commitment / self.saturation).clamp(0.0, 1.0) * self.max_bonus
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ControllerConfig {
    pub loop_detector: LoopDetectorConfig,
    pub commitment: CommitmentRamp,
    pub watchdog: StuckWatchdogConfig,
    /// Commitment gained per second while a plan's action is running.
    pub commitment_gain_per_second: f32,
    /// Remember the goal of a plan discarded on a precondition failure as
    /// `last_goal`, so the planner can avoid reselecting it immediately.
    pub remember_failed_goal: bool,
    /// Re-run arbitration this often while a plan is active. `None` disables
    /// preemption: a committed plan then runs until it finishes or fails.
    pub preemption_interval_seconds: Option<f32>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            loop_detector: LoopDetectorConfig::default(),
            commitment: CommitmentRamp::default(),
            watchdog: StuckWatchdogConfig::default(),
            commitment_gain_per_second: 1.0,
            remember_failed_goal: true,
            preemption_interval_seconds: None,
        }
    }
}

fn positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative_finite(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });

        if self.loop_detector.max_consecutive_failures == 0 {
            return invalid("loop_detector.max_consecutive_failures", "must be at least 1");
        }
        if !positive_finite(self.loop_detector.block_duration_seconds) {
            return invalid(
                "loop_detector.block_duration_seconds",
                "must be positive and finite",
            );
        }
        if !positive_finite(f64::from(self.commitment.saturation)) {
            return invalid("commitment.saturation", "must be positive and finite");
        }
        if !non_negative_finite(f64::from(self.commitment.max_bonus)) {
            return invalid("commitment.max_bonus", "must be non-negative and finite");
        }
        if !positive_finite(f64::from(self.watchdog.stall_seconds)) {
            return invalid("watchdog.stall_seconds", "must be positive and finite");
        }
        if !non_negative_finite(f64::from(self.watchdog.min_progress)) {
            return invalid("watchdog.min_progress", "must be non-negative and finite");
        }
        if !non_negative_finite(f64::from(self.watchdog.cooldown_seconds)) {
            return invalid("watchdog.cooldown_seconds", "must be non-negative and finite");
        }
        if !non_negative_finite(f64::from(self.commitment_gain_per_second)) {
            return invalid(
                "commitment_gain_per_second",
                "must be non-negative and finite",
            );
        }
        if let Some(interval) = self.preemption_interval_seconds {
            if !positive_finite(f64::from(interval)) {
                return invalid("preemption_interval_seconds", "must be positive and finite");
            }
        }
        Ok(())
    }

    /// Parse a YAML document (every field optional) and validate it.
    #[cfg(feature = "serde")]
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
}

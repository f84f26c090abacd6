//! Goal arbitration: which materialized goals may compete with the goal the
//! agent is already committed to.

use ai_core::Goal;

use crate::CommitmentRamp;

/// `current.priority + ramp.bonus(commitment)`, or `0` with no current goal.
pub fn priority_threshold(current: Option<&Goal>, commitment: f32, ramp: &CommitmentRamp) -> f32 {
    match current {
        Some(goal) => goal.priority + ramp.bonus(commitment),
        None => 0.0,
    }
}

/// Filter `candidates` down to the goals handed to the planner.
///
/// Without a current goal every candidate is eligible. With one, a candidate
/// must be urgent or strictly exceed the priority threshold. Goals for which
/// `is_blocked` holds are always removed. Order is preserved.
pub fn eligible_goals(
    candidates: Vec<Goal>,
    current: Option<&Goal>,
    commitment: f32,
    ramp: &CommitmentRamp,
    is_blocked: impl Fn(&Goal) -> bool,
) -> Vec<Goal> {
    let threshold = current.map(|_| priority_threshold(current, commitment, ramp));
    candidates
        .into_iter()
        .filter(|goal| match threshold {
            None => true,
            Some(threshold) => goal.urgent || goal.priority > threshold,
        })
        .filter(|goal| !is_blocked(goal))
        .collect()
}

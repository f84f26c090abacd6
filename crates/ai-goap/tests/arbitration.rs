use ai_core::{Goal, GoalKey};
use ai_goap::{eligible_goals, priority_threshold, CommitmentRamp};

fn names(goals: &[Goal]) -> Vec<&'static str> {
    goals.iter().map(|g| g.name()).collect()
}

#[test]
fn commitment_ramp_saturates() {
    let ramp = CommitmentRamp::default();
    assert_eq!(ramp.bonus(0.0), 0.0);
    assert!((ramp.bonus(1.0) - 0.6667).abs() < 1e-3);
    assert_eq!(ramp.bonus(1.5), 1.0);
    assert_eq!(ramp.bonus(10.0), 1.0);
    assert_eq!(ramp.bonus(-1.0), 0.0);
}

#[test]
fn threshold_is_zero_without_a_current_goal() {
    let ramp = CommitmentRamp::default();
    assert_eq!(priority_threshold(None, 5.0, &ramp), 0.0);

    let current = Goal::new(GoalKey("Work"), 2.0);
    assert_eq!(priority_threshold(Some(&current), 0.0, &ramp), 2.0);
}

#[test]
fn committed_goal_resists_a_slightly_higher_one() {
    let ramp = CommitmentRamp::default();
    let current = Goal::new(GoalKey("Work"), 2.0);
    let candidates = vec![
        Goal::new(GoalKey("Snack"), 2.5),
        Goal::new(GoalKey("Flee"), 2.5).urgent(),
        Goal::new(GoalKey("Rest"), 2.7),
    ];

    let eligible = eligible_goals(candidates, Some(&current), 1.0, &ramp, |_| false);
    assert_eq!(names(&eligible), vec!["Flee", "Rest"]);
}

#[test]
fn threshold_comparison_is_strict() {
    let ramp = CommitmentRamp::default();
    let current = Goal::new(GoalKey("Work"), 2.0);
    let candidates = vec![Goal::new(GoalKey("Work"), 2.0), Goal::new(GoalKey("Tie"), 2.0)];

    let eligible = eligible_goals(candidates, Some(&current), 0.0, &ramp, |_| false);
    assert!(eligible.is_empty());
}

#[test]
fn every_goal_is_eligible_without_a_current_goal() {
    let ramp = CommitmentRamp::default();
    let candidates = vec![
        Goal::new(GoalKey("Idle"), 0.0),
        Goal::new(GoalKey("Eat"), -1.0),
    ];

    let eligible = eligible_goals(candidates, None, 0.0, &ramp, |_| false);
    assert_eq!(names(&eligible), vec!["Idle", "Eat"]);
}

#[test]
fn blocked_goals_are_removed_even_when_urgent() {
    let ramp = CommitmentRamp::default();
    let candidates = vec![
        Goal::new(GoalKey("Flee"), 9.0).urgent(),
        Goal::new(GoalKey("Eat"), 1.0),
    ];

    let eligible = eligible_goals(candidates, None, 0.0, &ramp, |g| g.name() == "Flee");
    assert_eq!(names(&eligible), vec!["Eat"]);
}

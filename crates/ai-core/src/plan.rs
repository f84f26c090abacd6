use core::fmt;
use std::sync::Arc;

use crate::{ActionKey, ActionTemplate, Goal, WorldMut};

/// Deterministic, order-sensitive identity of a `(goal, action sequence)` pair.
///
/// Rendered as `goal::a1>a2>...`. The goal prefix length is stored alongside
/// the text, so goal names that happen to contain a separator still index
/// correctly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlanSignature {
    text: String,
    goal_len: usize,
}

impl PlanSignature {
    pub const GOAL_SEPARATOR: &'static str = "::";
    pub const ACTION_SEPARATOR: &'static str = ">";

    pub fn new<'a>(goal: &str, actions: impl IntoIterator<Item = &'a str>) -> Self {
        let mut text = String::with_capacity(goal.len() + 16);
        text.push_str(goal);
        text.push_str(Self::GOAL_SEPARATOR);
        for (i, action) in actions.into_iter().enumerate() {
            if i > 0 {
                text.push_str(Self::ACTION_SEPARATOR);
            }
            text.push_str(action);
        }
        Self {
            text,
            goal_len: goal.len(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn goal_name(&self) -> &str {
        &self.text[..self.goal_len]
    }
}

impl fmt::Display for PlanSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// An ordered, single-goal sequence of action templates with a cursor.
///
/// The step list is immutable once built; progress is tracked by `cursor`
/// (next step to instantiate) and `completed` (steps that finished). Each step
/// is instantiated through its template when the executor picks it.
pub struct Plan<W>
where
    W: WorldMut + 'static,
{
    goal: Goal,
    steps: Vec<Arc<dyn ActionTemplate<W>>>,
    cursor: usize,
    completed: usize,
    commitment: f32,
}

impl<W> Plan<W>
where
    W: WorldMut + 'static,
{
    pub fn new(goal: Goal, steps: Vec<Arc<dyn ActionTemplate<W>>>) -> Self {
        Self {
            goal,
            steps,
            cursor: 0,
            completed: 0,
            commitment: 0.0,
        }
    }

    pub fn with_commitment(mut self, commitment: f32) -> Self {
        self.commitment = commitment.max(0.0);
        self
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn has_remaining(&self) -> bool {
        self.cursor < self.steps.len()
    }

    pub fn remaining(&self) -> usize {
        self.steps.len() - self.cursor
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn commitment(&self) -> f32 {
        self.commitment
    }

    pub fn add_commitment(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.commitment += amount;
        }
    }

    /// Take the next step, advancing the cursor past it.
    pub fn next_step(&mut self) -> Option<Arc<dyn ActionTemplate<W>>> {
        let step = self.steps.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(step)
    }

    pub fn peek_step(&self) -> Option<ActionKey> {
        self.steps.get(self.cursor).map(|s| s.key())
    }

    pub fn mark_step_completed(&mut self) {
        self.completed = (self.completed + 1).min(self.cursor);
    }

    /// Move the cursor back to the first step that has not completed, so an
    /// interrupted step is instantiated afresh when the plan resumes.
    pub fn rewind_unfinished(&mut self) {
        self.cursor = self.completed;
    }

    pub fn action_names(&self) -> Vec<ActionKey> {
        self.steps.iter().map(|s| s.key()).collect()
    }

    pub fn signature(&self) -> PlanSignature {
        PlanSignature::new(self.goal.name(), self.steps.iter().map(|s| s.key().as_str()))
    }
}

impl<W> fmt::Debug for Plan<W>
where
    W: WorldMut + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plan")
            .field("goal", &self.goal)
            .field("steps", &self.action_names())
            .field("cursor", &self.cursor)
            .field("completed", &self.completed)
            .field("commitment", &self.commitment)
            .finish()
    }
}

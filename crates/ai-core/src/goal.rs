use core::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{Beliefs, TickContext, WorldView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GoalKey(pub &'static str);

impl GoalKey {
    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for GoalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A goal materialized for one agent on one tick. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Goal {
    pub key: GoalKey,
    pub priority: f32,
    /// Urgent goals bypass the priority/commitment comparison.
    pub urgent: bool,
}

impl Goal {
    pub fn new(key: GoalKey, priority: f32) -> Self {
        Self {
            key,
            priority,
            urgent: false,
        }
    }

    pub fn urgent(mut self) -> Self {
        self.urgent = true;
        self
    }

    pub fn with_urgency(mut self, urgent: bool) -> Self {
        self.urgent = urgent;
        self
    }

    pub fn name(&self) -> &'static str {
        self.key.0
    }
}

/// Produces a [`Goal`] for an agent each tick (e.g. priority scaled by hunger).
pub trait GoalTemplate<W>: 'static
where
    W: WorldView,
{
    fn materialize(&self, ctx: &TickContext, agent: W::Agent, world: &W, beliefs: &Beliefs)
        -> Goal;
}

/// A fixed goal materializes to itself.
impl<W> GoalTemplate<W> for Goal
where
    W: WorldView,
{
    fn materialize(
        &self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        _beliefs: &Beliefs,
    ) -> Goal {
        self.clone()
    }
}

/// Goal whose priority/urgency is computed from beliefs.
pub struct DynamicGoal {
    key: GoalKey,
    score: Box<dyn Fn(&Beliefs) -> (f32, bool)>,
}

impl DynamicGoal {
    pub fn new(key: GoalKey, score: impl Fn(&Beliefs) -> (f32, bool) + 'static) -> Self {
        Self {
            key,
            score: Box::new(score),
        }
    }
}

impl<W> GoalTemplate<W> for DynamicGoal
where
    W: WorldView,
{
    fn materialize(
        &self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        beliefs: &Beliefs,
    ) -> Goal {
        let (priority, urgent) = (self.score)(beliefs);
        Goal::new(self.key, priority).with_urgency(urgent)
    }
}

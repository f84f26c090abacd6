use core::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use ai_core::{
    ActionKey, ActionTemplate, Beliefs, Goal, GoalKey, Plan, TickContext, WorldMut, WorldView,
};

/// Everything a planner sees when the controller asks for a plan.
pub struct PlanRequest<'a, W>
where
    W: WorldMut + 'static,
{
    pub ctx: &'a TickContext,
    pub agent: W::Agent,
    pub world: &'a W,
    pub beliefs: &'a Beliefs,
    /// Eligible goals, already filtered by arbitration and loop blocking.
    pub goals: &'a [Goal],
    pub last_goal: Option<&'a Goal>,
}

/// Opaque plan source consumed by the controller.
///
/// Returning `None` means "no plan this tick"; the controller asks again on
/// the next tick.
pub trait Planner<W>: 'static
where
    W: WorldMut + 'static,
{
    fn plan(&mut self, request: PlanRequest<'_, W>) -> Option<Plan<W>>;
}

pub type GoapState = u64;

pub struct GoapAction<W>
where
    W: WorldMut + 'static,
{
    pub cost: u32,
    pub preconditions: GoapState,
    pub add: GoapState,
    pub remove: GoapState,
    pub template: Arc<dyn ActionTemplate<W>>,
}

impl<W> GoapAction<W>
where
    W: WorldMut + 'static,
{
    pub fn new(template: Arc<dyn ActionTemplate<W>>, cost: u32) -> Self {
        Self {
            cost,
            preconditions: 0,
            add: 0,
            remove: 0,
            template,
        }
    }

    pub fn requires(mut self, facts: GoapState) -> Self {
        self.preconditions |= facts;
        self
    }

    pub fn adds(mut self, facts: GoapState) -> Self {
        self.add |= facts;
        self
    }

    pub fn removes(mut self, facts: GoapState) -> Self {
        self.remove |= facts;
        self
    }

    pub fn key(&self) -> ActionKey {
        self.template.key()
    }

    pub fn is_applicable(&self, state: GoapState) -> bool {
        (state & self.preconditions) == self.preconditions
    }

    pub fn apply(&self, state: GoapState) -> GoapState {
        (state | self.add) & !self.remove
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct GoapPlannerConfig {
    pub max_expansions: usize,
    /// Priority subtracted from the previous goal when ranking candidates, so
    /// an equally ranked alternative wins the tie.
    pub last_goal_penalty: f32,
}

impl Default for GoapPlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: 4096,
            last_goal_penalty: 0.01,
        }
    }
}

type StateFn<W> = Box<dyn Fn(&W, <W as WorldView>::Agent, &Beliefs) -> GoapState>;

/// Deterministic A* over bitset facts.
///
/// Goals are mapped to the facts that satisfy them with [`with_goal`]; a
/// candidate goal without a mapping is skipped. World facts are read through
/// the state function given to [`new`].
///
/// [`with_goal`]: GoapPlanner::with_goal
/// [`new`]: GoapPlanner::new
pub struct GoapPlanner<W>
where
    W: WorldMut + 'static,
{
    actions: Vec<GoapAction<W>>,
    goals: BTreeMap<GoalKey, GoapState>,
    state_fn: StateFn<W>,
    config: GoapPlannerConfig,
}

impl<W> GoapPlanner<W>
where
    W: WorldMut + 'static,
{
    pub fn new(
        actions: Vec<GoapAction<W>>,
        state_fn: impl Fn(&W, W::Agent, &Beliefs) -> GoapState + 'static,
    ) -> Self {
        Self {
            actions,
            goals: BTreeMap::new(),
            state_fn: Box::new(state_fn),
            config: GoapPlannerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GoapPlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_goal(mut self, goal: GoalKey, desired: GoapState) -> Self {
        self.goals.insert(goal, desired);
        self
    }

    pub fn actions(&self) -> &[GoapAction<W>] {
        &self.actions
    }

    pub fn config(&self) -> &GoapPlannerConfig {
        &self.config
    }

    /// Cheapest action sequence taking `start` to a state containing `goal`.
    /// An already satisfied goal yields an empty sequence.
    pub fn search(
        &self,
        start: GoapState,
        goal: GoapState,
    ) -> Option<Vec<Arc<dyn ActionTemplate<W>>>> {
        if (start & goal) == goal {
            return Some(Vec::new());
        }

        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct OpenNode {
            f: u32,
            g: u32,
            state: GoapState,
            tie: u64,
        }

        impl OpenNode {
            fn key(&self) -> (u32, u32, GoapState, u64) {
                (self.f, self.g, self.state, self.tie)
            }
        }

        impl Ord for OpenNode {
            fn cmp(&self, other: &Self) -> Ordering {
                // Reversed so BinaryHeap pops the smallest key.
                other.key().cmp(&self.key())
            }
        }

        impl PartialOrd for OpenNode {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        // Missing goal bits.
        let h = |state: GoapState| -> u32 { (goal & !state).count_ones() };

        let mut open = BinaryHeap::<OpenNode>::new();
        let mut tie: u64 = 0;

        let mut g_score: BTreeMap<GoapState, u32> = BTreeMap::new();
        let mut came_from: BTreeMap<GoapState, (GoapState, usize)> = BTreeMap::new();

        g_score.insert(start, 0);
        open.push(OpenNode {
            f: h(start),
            g: 0,
            state: start,
            tie,
        });
        tie += 1;

        let mut expansions: usize = 0;

        while let Some(node) = open.pop() {
            expansions += 1;
            if expansions > self.config.max_expansions {
                return None;
            }

            if (node.state & goal) == goal {
                let mut steps = Vec::new();
                let mut current = node.state;
                while let Some((prev, action_idx)) = came_from.get(&current).copied() {
                    steps.push(Arc::clone(&self.actions[action_idx].template));
                    current = prev;
                }
                steps.reverse();
                return Some(steps);
            }

            let best_g = g_score.get(&node.state).copied().unwrap_or(u32::MAX);
            if node.g != best_g {
                continue; // stale heap entry
            }

            for (action_idx, action) in self.actions.iter().enumerate() {
                if !action.is_applicable(node.state) {
                    continue;
                }
                let next = action.apply(node.state);
                if next == node.state {
                    continue;
                }

                let next_g = node.g.saturating_add(action.cost);
                let prev_best = g_score.get(&next).copied().unwrap_or(u32::MAX);
                if next_g >= prev_best {
                    continue;
                }

                g_score.insert(next, next_g);
                came_from.insert(next, (node.state, action_idx));

                open.push(OpenNode {
                    f: next_g.saturating_add(h(next)),
                    g: next_g,
                    state: next,
                    tie,
                });
                tie += 1;
            }
        }

        None
    }
}

impl<W> Planner<W> for GoapPlanner<W>
where
    W: WorldMut + 'static,
{
    fn plan(&mut self, request: PlanRequest<'_, W>) -> Option<Plan<W>> {
        let start = (self.state_fn)(request.world, request.agent, request.beliefs);

        let penalty = self.config.last_goal_penalty;
        let mut ranked: Vec<(f32, &Goal)> = request
            .goals
            .iter()
            .map(|goal| {
                let demoted = request.last_goal.is_some_and(|last| last.key == goal.key);
                let score = if demoted {
                    goal.priority - penalty
                } else {
                    goal.priority
                };
                (score, goal)
            })
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (_, goal) in ranked {
            let Some(&desired) = self.goals.get(&goal.key) else {
                continue;
            };
            if (start & desired) == desired {
                continue;
            }
            if let Some(steps) = self.search(start, desired) {
                return Some(Plan::new(goal.clone(), steps));
            }
        }
        None
    }
}

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ai_core::{
    Action, ActionKey, ActionTemplate, Beliefs, Plan, TickContext, WorldMut, WorldView,
};
use ai_goap::{ExecutionController, GoapState, PlanRequest, Planner};
use ai_nav::{LinearMover, MovementView, MovementWorld, Vec2};

pub const AGENT: u64 = 7;

/// Movement world with a hook log and a fact bitset for the GOAP planner.
#[derive(Default)]
pub struct TestWorld {
    pub mover: LinearMover<u64>,
    pub log: Vec<String>,
    pub facts: GoapState,
}

impl TestWorld {
    pub fn with_agent() -> Self {
        let mut world = Self::default();
        world.mover.spawn(AGENT, Vec2::ZERO, 1.0);
        world
    }

    pub fn count(&self, entry: &str) -> usize {
        self.log.iter().filter(|e| *e == entry).count()
    }
}

impl WorldView for TestWorld {
    type Agent = u64;
}

impl WorldMut for TestWorld {}

impl MovementView for TestWorld {
    fn position(&self, agent: u64) -> Option<Vec2> {
        self.mover.position(agent)
    }

    fn has_path(&self, agent: u64) -> bool {
        self.mover.has_path(agent)
    }

    fn path_pending(&self, agent: u64) -> bool {
        self.mover.path_pending(agent)
    }

    fn remaining_distance(&self, agent: u64) -> f32 {
        self.mover.remaining_distance(agent)
    }
}

impl MovementWorld for TestWorld {
    fn reset_path(&mut self, agent: u64) {
        self.mover.reset_path(agent);
    }

    fn set_destination(&mut self, agent: u64, destination: Vec2) -> bool {
        self.mover.set_destination(agent, destination)
    }

    fn set_halted(&mut self, agent: u64, halted: bool) {
        self.mover.set_halted(agent, halted);
    }
}

/// Action prototype that completes after a fixed number of updates and logs
/// every hook as `hook:Key`.
#[derive(Clone)]
pub struct ScriptedTemplate {
    key: ActionKey,
    updates: u32,
    ready: Arc<AtomicBool>,
    destination: Option<Vec2>,
    sets_fact: GoapState,
}

impl ScriptedTemplate {
    pub fn new(key: &'static str, updates: u32) -> Self {
        Self {
            key: ActionKey(key),
            updates,
            ready: Arc::new(AtomicBool::new(true)),
            destination: None,
            sets_fact: 0,
        }
    }

    pub fn endless(key: &'static str) -> Self {
        Self::new(key, u32::MAX)
    }

    /// Preconditions hold while the returned flag is set.
    pub fn gated(mut self, ready: bool) -> (Self, Arc<AtomicBool>) {
        self.ready = Arc::new(AtomicBool::new(ready));
        let flag = Arc::clone(&self.ready);
        (self, flag)
    }

    pub fn moving_to(mut self, destination: Vec2) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn setting(mut self, facts: GoapState) -> Self {
        self.sets_fact = facts;
        self
    }

    pub fn shared(self) -> Arc<dyn ActionTemplate<TestWorld>> {
        Arc::new(self)
    }
}

impl ActionTemplate<TestWorld> for ScriptedTemplate {
    fn key(&self) -> ActionKey {
        self.key
    }

    fn create(&self, agent: u64) -> Box<dyn Action<TestWorld>> {
        Box::new(ScriptedAction {
            agent,
            template: self.clone(),
            remaining: self.updates,
            complete: false,
        })
    }
}

struct ScriptedAction {
    agent: u64,
    template: ScriptedTemplate,
    remaining: u32,
    complete: bool,
}

impl ScriptedAction {
    fn log(&self, world: &mut TestWorld, hook: &str) {
        world.log.push(format!("{hook}:{}", self.template.key));
    }
}

impl Action<TestWorld> for ScriptedAction {
    fn key(&self) -> ActionKey {
        self.template.key
    }

    fn can_perform(&self, _ctx: &TickContext, _world: &TestWorld, _beliefs: &Beliefs) -> bool {
        self.template.ready.load(Ordering::SeqCst)
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn on_start(&mut self, _ctx: &TickContext, world: &mut TestWorld, _beliefs: &mut Beliefs) {
        self.log(world, "start");
        if let Some(destination) = self.template.destination {
            world.set_destination(self.agent, destination);
        }
    }

    fn on_update(&mut self, _ctx: &TickContext, world: &mut TestWorld, _beliefs: &mut Beliefs) {
        self.log(world, "update");
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.complete = true;
        }
    }

    fn on_stop(&mut self, _ctx: &TickContext, world: &mut TestWorld, _beliefs: &mut Beliefs) {
        self.log(world, "stop");
    }

    fn on_complete(&mut self, _ctx: &TickContext, world: &mut TestWorld, _beliefs: &mut Beliefs) {
        self.log(world, "complete");
        world.facts |= self.template.sets_fact;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanCall {
    pub goals: Vec<&'static str>,
    pub last_goal: Option<&'static str>,
}

/// Returns a fixed recipe for the highest-priority eligible goal that has one,
/// and records every request.
#[derive(Default)]
pub struct ScriptedPlanner {
    recipes: BTreeMap<&'static str, Vec<Arc<dyn ActionTemplate<TestWorld>>>>,
    calls: Rc<RefCell<Vec<PlanCall>>>,
}

impl ScriptedPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipe(
        mut self,
        goal: &'static str,
        steps: Vec<Arc<dyn ActionTemplate<TestWorld>>>,
    ) -> Self {
        self.recipes.insert(goal, steps);
        self
    }

    pub fn calls(&self) -> Rc<RefCell<Vec<PlanCall>>> {
        Rc::clone(&self.calls)
    }
}

impl Planner<TestWorld> for ScriptedPlanner {
    fn plan(&mut self, request: PlanRequest<'_, TestWorld>) -> Option<Plan<TestWorld>> {
        self.calls.borrow_mut().push(PlanCall {
            goals: request.goals.iter().map(|g| g.name()).collect(),
            last_goal: request.last_goal.map(|g| g.name()),
        });

        let goal = request
            .goals
            .iter()
            .filter(|g| self.recipes.contains_key(g.name()))
            .max_by(|a, b| a.priority.total_cmp(&b.priority))?;
        let steps = self.recipes.get(goal.name())?.clone();
        Some(Plan::new(goal.clone(), steps))
    }
}

/// A controller and its world advanced together with a fixed delta.
pub struct Sim {
    pub controller: ExecutionController<TestWorld>,
    pub world: TestWorld,
    pub dt: f32,
    next_tick: u64,
}

impl Sim {
    pub fn new(controller: ExecutionController<TestWorld>, dt: f32) -> Self {
        Self {
            controller,
            world: TestWorld::with_agent(),
            dt,
            next_tick: 0,
        }
    }

    /// Context for the tick that `step` will run next.
    pub fn ctx(&self) -> TickContext {
        TickContext::new(self.next_tick, self.dt)
    }

    /// Move the backend, then tick the controller.
    pub fn step(&mut self) {
        let ctx = self.ctx();
        self.world.mover.step(self.dt);
        self.controller.tick(&ctx, &mut self.world);
        self.next_tick += 1;
    }

    pub fn steps(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    pub fn log(&self) -> &[String] {
        &self.world.log
    }
}

//! The per-agent execution controller.
//!
//! One `tick` runs, in order: the stall check, exactly one of the three
//! execution branches (pick the next action, advance the current one, or
//! request a plan), the perception refresh, and the loop-block sweep. Nothing
//! escapes `tick` as an error; failures become state transitions, `tracing`
//! diagnostics and trace events.

use std::borrow::Cow;

use ai_core::{
    ActionKey, ActionRuntime, AgentId, Beliefs, Clock, Goal, GoalTemplate, Perception, Plan,
    SimClock, StartOutcome, TickContext,
};
use ai_nav::{MovementWorld, StallEvent, StuckWatchdog, Watchdog};
use ai_tools::{NullTraceSink, TraceEvent, TraceSink};

use crate::{
    eligible_goals, ActionHistory, ConfigError, ControllerConfig, FailureLoopDetector, NoResume,
    PlanRequest, PlanResume, Planner,
};

pub struct ExecutionController<W>
where
    W: MovementWorld + 'static,
{
    agent: W::Agent,
    config: ControllerConfig,

    planner: Option<Box<dyn Planner<W>>>,
    goals: Vec<Box<dyn GoalTemplate<W>>>,
    perception: Vec<Box<dyn Perception<W>>>,
    resume: Box<dyn PlanResume<W>>,
    watchdog: Box<dyn Watchdog<W>>,
    clock: Box<dyn Clock>,
    trace: Box<dyn TraceSink>,

    beliefs: Beliefs,
    runtime: ActionRuntime<W>,
    plan: Option<Plan<W>>,
    current_goal: Option<Goal>,
    last_goal: Option<Goal>,
    loop_detector: FailureLoopDetector,
    history: ActionHistory,

    initialized: bool,
    since_preemption_check: f32,
}

impl<W> ExecutionController<W>
where
    W: MovementWorld + 'static,
{
    pub fn new(agent: W::Agent) -> Self {
        let config = ControllerConfig::default();
        Self {
            agent,
            loop_detector: FailureLoopDetector::new(config.loop_detector),
            watchdog: Box::new(StuckWatchdog::new(config.watchdog)),
            config,
            planner: None,
            goals: Vec::new(),
            perception: Vec::new(),
            resume: Box::new(NoResume),
            clock: Box::new(SimClock::new()),
            trace: Box::new(NullTraceSink),
            beliefs: Beliefs::new(),
            runtime: ActionRuntime::default(),
            plan: None,
            current_goal: None,
            last_goal: None,
            history: ActionHistory::new(),
            initialized: false,
            since_preemption_check: 0.0,
        }
    }

    /// Validate and apply `config`. Rebuilds the loop detector and installs a
    /// [`StuckWatchdog`] built from `config.watchdog`, so a custom watchdog
    /// must be set after this call.
    pub fn with_config(mut self, config: ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.loop_detector = FailureLoopDetector::new(config.loop_detector);
        self.watchdog = Box::new(StuckWatchdog::new(config.watchdog));
        self.config = config;
        Ok(self)
    }

    pub fn with_planner(mut self, planner: impl Planner<W>) -> Self {
        self.planner = Some(Box::new(planner));
        self
    }

    pub fn with_goal(mut self, goal: impl GoalTemplate<W>) -> Self {
        self.goals.push(Box::new(goal));
        self
    }

    pub fn with_perception(mut self, perception: impl Perception<W>) -> Self {
        self.perception.push(Box::new(perception));
        self
    }

    pub fn with_resume(mut self, resume: impl PlanResume<W>) -> Self {
        self.resume = Box::new(resume);
        self
    }

    pub fn with_watchdog(mut self, watchdog: impl Watchdog<W>) -> Self {
        self.watchdog = Box::new(watchdog);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_trace_sink(mut self, sink: impl TraceSink + 'static) -> Self {
        self.trace = Box::new(sink);
        self
    }

    pub fn agent(&self) -> W::Agent {
        self.agent
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn current_plan(&self) -> Option<&Plan<W>> {
        self.plan.as_ref()
    }

    pub fn current_goal(&self) -> Option<&Goal> {
        self.current_goal.as_ref()
    }

    pub fn last_goal(&self) -> Option<&Goal> {
        self.last_goal.as_ref()
    }

    pub fn current_action(&self) -> Option<ActionKey> {
        self.runtime.current_key()
    }

    pub fn action_history(&self) -> &ActionHistory {
        &self.history
    }

    pub fn loop_detector(&self) -> &FailureLoopDetector {
        &self.loop_detector
    }

    pub fn belief(&self, name: &str) -> Option<bool> {
        self.beliefs.get(name)
    }

    pub fn beliefs(&self) -> &Beliefs {
        &self.beliefs
    }

    pub fn beliefs_mut(&mut self) -> &mut Beliefs {
        &mut self.beliefs
    }

    /// Current time on the controller's clock.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Bind the agent's starting state. `tick` calls this on first use if the
    /// owner did not.
    pub fn initialize(&mut self, world: &W) {
        self.watchdog.initialize(world.position(self.agent));
        self.initialized = true;
        tracing::debug!(agent = self.agent.stable_id(), "GOAP controller initialized");
    }

    pub fn tick(&mut self, ctx: &TickContext, world: &mut W) {
        if !self.initialized {
            self.initialize(world);
        }

        let dt = ctx.clamped_dt();
        self.clock.advance(dt);
        let now = self.clock.now();

        if !self.runtime.is_idle() && world.has_path(self.agent) {
            if let Some(stall) = self.watchdog.update(world, self.agent, dt) {
                self.recover_from_stall(ctx, world, stall, now);
            }
        }

        let has_remaining = self.plan.as_ref().is_some_and(|plan| plan.has_remaining());
        if has_remaining && self.runtime.is_idle() {
            self.pick_next_action(ctx, world, now);
        } else if !self.runtime.is_idle() {
            self.advance_current(ctx, world, now);
        } else {
            self.request_plan(ctx, world, now);
        }

        for perception in &mut self.perception {
            perception.refresh(ctx, self.agent, world, &mut self.beliefs);
        }

        self.loop_detector.purge_expired_blocks(now);
    }

    /// Set the current plan aside: stop the running action (no `on_complete`),
    /// clear the path, and hand the plan, rewound to its first unfinished
    /// step, to the resume hook. Returns `false` when there was no plan.
    pub fn interrupt(&mut self, ctx: &TickContext, world: &mut W) -> bool {
        let Some(mut plan) = self.plan.take() else {
            return false;
        };
        let _ = self.runtime.abort(ctx, world, &mut self.beliefs);
        world.reset_path(self.agent);
        plan.rewind_unfinished();

        let signature = plan.signature();
        tracing::info!(
            agent = self.agent.stable_id(),
            plan = %signature,
            "GOAP plan interrupted"
        );
        self.emit(ctx, "goap.plan.interrupted", signature.to_string());

        self.resume.on_interrupted(plan);
        self.current_goal = None;
        true
    }

    /// Abort everything without recording a failure and forget all
    /// per-agent bookkeeping.
    pub fn reset(&mut self, ctx: &TickContext, world: &mut W) {
        let _ = self.runtime.abort(ctx, world, &mut self.beliefs);
        world.reset_path(self.agent);
        world.set_halted(self.agent, false);

        self.plan = None;
        self.current_goal = None;
        self.last_goal = None;
        self.loop_detector.clear();
        self.history.clear();
        self.resume.clear();
        self.since_preemption_check = 0.0;
        self.watchdog.initialize(world.position(self.agent));

        tracing::info!(agent = self.agent.stable_id(), "GOAP controller reset");
    }

    fn emit(
        &mut self,
        ctx: &TickContext,
        tag: &'static str,
        detail: impl Into<Cow<'static, str>>,
    ) {
        self.trace.emit(
            TraceEvent::new(ctx.tick, tag)
                .with_agent(self.agent.stable_id())
                .with_detail(detail),
        );
    }

    fn pick_next_action(&mut self, ctx: &TickContext, world: &mut W, now: f64) {
        world.reset_path(self.agent);
        world.set_halted(self.agent, false);

        let Some(template) = self.plan.as_mut().and_then(|plan| plan.next_step()) else {
            return;
        };
        let key = template.key();
        let action = template.create(self.agent);

        match self.runtime.start(action, ctx, world, &mut self.beliefs) {
            StartOutcome::Started => {
                tracing::debug!(
                    agent = self.agent.stable_id(),
                    action = %key,
                    "GOAP action started"
                );
                self.emit(ctx, "goap.action.start", key.as_str());
                self.watchdog.on_new_action(world.position(self.agent));
            }
            StartOutcome::Rejected => {
                tracing::debug!(
                    agent = self.agent.stable_id(),
                    action = %key,
                    "GOAP action preconditions failed"
                );
                self.emit(ctx, "goap.action.rejected", key.as_str());
                self.fail_plan(ctx, now);
            }
        }
    }

    fn advance_current(&mut self, ctx: &TickContext, world: &mut W, now: f64) {
        let dt = ctx.clamped_dt();
        if let Some(plan) = self.plan.as_mut() {
            plan.add_commitment(dt * self.config.commitment_gain_per_second);
        }

        let Some(key) = self.runtime.update(ctx, world, &mut self.beliefs) else {
            self.maybe_preempt(ctx, world, now, dt);
            return;
        };

        self.history.on_action_completed(key, now);
        tracing::debug!(
            agent = self.agent.stable_id(),
            action = %key,
            "GOAP action completed"
        );
        self.emit(ctx, "goap.action.complete", key.as_str());

        let finished = match self.plan.as_mut() {
            Some(plan) => {
                plan.mark_step_completed();
                !plan.has_remaining()
            }
            None => false,
        };
        if finished {
            self.succeed_plan(ctx);
        }
    }

    fn request_plan(&mut self, ctx: &TickContext, world: &mut W, now: f64) {
        if self.plan.is_some() {
            // A plan with nothing left to run finished without a final action.
            self.succeed_plan(ctx);
            return;
        }

        if let Some(plan) = self.resume.resume(ctx, self.agent, world, &self.beliefs) {
            let signature = plan.signature();
            if self.loop_detector.is_goal_blocked(plan.goal().name(), now) {
                tracing::info!(
                    agent = self.agent.stable_id(),
                    plan = %signature,
                    "Discarding resumed GOAP plan for a blocked goal"
                );
            } else {
                tracing::info!(
                    agent = self.agent.stable_id(),
                    plan = %signature,
                    "GOAP plan resumed"
                );
                self.emit(ctx, "goap.plan.resumed", signature.to_string());
                self.adopt(ctx, plan, now);
                return;
            }
        }

        match self.compute_plan(ctx, world, now) {
            Some(plan) => self.adopt(ctx, plan, now),
            None => {
                tracing::debug!(agent = self.agent.stable_id(), "GOAP planner returned no plan");
                self.emit(ctx, "goap.plan.none", "");
            }
        }
    }

    /// Run arbitration against the current goal and commitment, then ask the
    /// planner. `None` covers a missing planner, no eligible goal and a
    /// planner that found nothing.
    fn compute_plan(&mut self, ctx: &TickContext, world: &W, now: f64) -> Option<Plan<W>> {
        let Some(planner) = self.planner.as_mut() else {
            tracing::debug!(agent = self.agent.stable_id(), "No GOAP planner bound");
            return None;
        };

        let candidates: Vec<Goal> = self
            .goals
            .iter()
            .map(|template| template.materialize(ctx, self.agent, world, &self.beliefs))
            .collect();
        let commitment = self.plan.as_ref().map_or(0.0, |plan| plan.commitment());
        let detector = &self.loop_detector;
        let eligible = eligible_goals(
            candidates,
            self.current_goal.as_ref(),
            commitment,
            &self.config.commitment,
            |goal| detector.is_goal_blocked(goal.name(), now),
        );
        if eligible.is_empty() {
            return None;
        }

        planner.plan(PlanRequest {
            ctx,
            agent: self.agent,
            world,
            beliefs: &self.beliefs,
            goals: &eligible,
            last_goal: self.last_goal.as_ref(),
        })
    }

    fn adopt(&mut self, ctx: &TickContext, plan: Plan<W>, now: f64) {
        let signature = plan.signature();
        if self.loop_detector.is_plan_blocked(&signature, now) {
            tracing::debug!(
                agent = self.agent.stable_id(),
                plan = %signature,
                "Ignoring blocked GOAP plan"
            );
            self.emit(ctx, "goap.plan.none", signature.to_string());
            return;
        }

        tracing::info!(
            agent = self.agent.stable_id(),
            goal = %plan.goal().key,
            priority = plan.goal().priority,
            steps = plan.remaining(),
            "GOAP plan adopted"
        );
        self.emit(ctx, "goap.plan.start", signature.to_string());

        self.current_goal = Some(plan.goal().clone());
        self.since_preemption_check = 0.0;
        let finished = !plan.has_remaining();
        self.plan = Some(plan);
        if finished {
            self.succeed_plan(ctx);
        }
    }

    fn succeed_plan(&mut self, ctx: &TickContext) {
        let Some(plan) = self.plan.take() else {
            return;
        };
        let signature = plan.signature();
        self.loop_detector.on_plan_succeeded(&signature);

        tracing::info!(
            agent = self.agent.stable_id(),
            plan = %signature,
            "GOAP plan succeeded"
        );
        self.emit(ctx, "goap.plan.success", signature.to_string());

        self.last_goal = Some(plan.goal().clone());
        self.current_goal = None;
    }

    /// Precondition failure: the plan is discarded and, if configured, its goal
    /// is remembered as `last_goal`.
    fn fail_plan(&mut self, ctx: &TickContext, now: f64) {
        let Some(plan) = self.plan.take() else {
            return;
        };
        self.record_failure(ctx, &plan, now);
        if self.config.remember_failed_goal {
            self.last_goal = Some(plan.goal().clone());
        }
        self.current_goal = None;
    }

    fn record_failure(&mut self, ctx: &TickContext, plan: &Plan<W>, now: f64) {
        let signature = plan.signature();
        let blocked = self.loop_detector.on_plan_failed(&signature, now);

        tracing::warn!(
            agent = self.agent.stable_id(),
            plan = %signature,
            failures = self.loop_detector.failure_count(&signature),
            "GOAP plan failed"
        );
        self.emit(ctx, "goap.plan.failure", signature.to_string());

        if blocked {
            tracing::warn!(
                agent = self.agent.stable_id(),
                plan = %signature,
                until = self.loop_detector.blocked_until(&signature).unwrap_or(now),
                "GOAP plan blocked after repeated failures"
            );
            self.emit(ctx, "goap.loop.blocked", signature.to_string());
        }
    }

    fn recover_from_stall(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        stall: StallEvent,
        now: f64,
    ) {
        tracing::warn!(
            agent = self.agent.stable_id(),
            x = stall.position.x,
            y = stall.position.y,
            stalled_for = stall.stalled_for,
            "Agent stalled; aborting GOAP plan"
        );
        self.emit(ctx, "goap.stall", "");

        if let Some(plan) = self.plan.take() {
            self.record_failure(ctx, &plan, now);
        }
        let _ = self.runtime.abort(ctx, world, &mut self.beliefs);
        self.current_goal = None;

        world.reset_path(self.agent);
        world.set_halted(self.agent, true);
        self.watchdog.start_cooldown();
    }

    fn maybe_preempt(&mut self, ctx: &TickContext, world: &mut W, now: f64, dt: f32) {
        let Some(interval) = self.config.preemption_interval_seconds else {
            return;
        };
        self.since_preemption_check += dt;
        if self.since_preemption_check < interval {
            return;
        }
        self.since_preemption_check = 0.0;

        let Some(current) = self.current_goal.as_ref().map(|goal| goal.key) else {
            return;
        };
        let Some(candidate) = self.compute_plan(ctx, world, now) else {
            return;
        };
        if candidate.goal().key == current {
            return;
        }

        tracing::info!(
            agent = self.agent.stable_id(),
            from = %current,
            to = %candidate.goal().key,
            "Preempting GOAP plan"
        );
        self.interrupt(ctx, world);
        self.adopt(ctx, candidate, now);
    }
}

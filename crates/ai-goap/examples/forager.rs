//! A hungry forager walks to a berry bush, harvests, and eats.
//!
//! Run with `RUST_LOG=debug cargo run -p ai-goap --example forager` to see
//! every controller transition.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use ai_core::{
    Action, ActionKey, ActionTemplate, Beliefs, DynamicGoal, GoalKey, Perception, TickContext,
    WorldMut, WorldView,
};
use ai_goap::{ControllerConfig, ExecutionController, GoapAction, GoapPlanner, GoapState};
use ai_nav::{LinearMover, MoveToTemplate, MovementView, MovementWorld, Vec2};
use ai_tools::TraceLog;
use tracing_subscriber::{fmt, EnvFilter};

const FORAGER: u64 = 1;
const BUSH: Vec2 = Vec2 { x: 4.0, y: 3.0 };

const AT_BUSH: GoapState = 1 << 0;
const HAS_BERRIES: GoapState = 1 << 1;
const FED: GoapState = 1 << 2;

const EAT: GoalKey = GoalKey("Eat");

#[derive(Default)]
struct Meadow {
    mover: LinearMover<u64>,
    basket: u32,
    fed: bool,
}

impl WorldView for Meadow {
    type Agent = u64;
}

impl WorldMut for Meadow {}

impl MovementView for Meadow {
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

impl MovementWorld for Meadow {
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

fn facts(world: &Meadow, agent: u64) -> GoapState {
    let mut state = 0;
    if world
        .position(agent)
        .is_some_and(|p| p.distance(BUSH) <= 0.2)
    {
        state |= AT_BUSH;
    }
    if world.basket > 0 {
        state |= HAS_BERRIES;
    }
    if world.fed {
        state |= FED;
    }
    state
}

struct Harvest;

struct Harvesting {
    agent: u64,
    seconds_left: f32,
}

impl ActionTemplate<Meadow> for Harvest {
    fn key(&self) -> ActionKey {
        ActionKey("Harvest")
    }

    fn create(&self, agent: u64) -> Box<dyn Action<Meadow>> {
        Box::new(Harvesting {
            agent,
            seconds_left: 0.5,
        })
    }
}

impl Action<Meadow> for Harvesting {
    fn key(&self) -> ActionKey {
        ActionKey("Harvest")
    }

    fn can_perform(&self, _ctx: &TickContext, world: &Meadow, _beliefs: &Beliefs) -> bool {
        facts(world, self.agent) & AT_BUSH != 0
    }

    fn is_complete(&self) -> bool {
        self.seconds_left <= 0.0
    }

    fn on_update(&mut self, ctx: &TickContext, world: &mut Meadow, _beliefs: &mut Beliefs) {
        self.seconds_left -= ctx.clamped_dt();
        if self.seconds_left <= 0.0 {
            world.basket += 3;
        }
    }
}

struct Eat;

struct Eating {
    done: bool,
}

impl ActionTemplate<Meadow> for Eat {
    fn key(&self) -> ActionKey {
        ActionKey("Eat")
    }

    fn create(&self, _agent: u64) -> Box<dyn Action<Meadow>> {
        Box::new(Eating { done: false })
    }
}

impl Action<Meadow> for Eating {
    fn key(&self) -> ActionKey {
        ActionKey("Eat")
    }

    fn can_perform(&self, _ctx: &TickContext, world: &Meadow, _beliefs: &Beliefs) -> bool {
        world.basket > 0
    }

    fn is_complete(&self) -> bool {
        self.done
    }

    fn on_update(&mut self, _ctx: &TickContext, world: &mut Meadow, _beliefs: &mut Beliefs) {
        world.basket -= 1;
        world.fed = true;
        self.done = true;
    }
}

struct Hunger;

impl Perception<Meadow> for Hunger {
    fn refresh(&mut self, _ctx: &TickContext, _agent: u64, world: &Meadow, beliefs: &mut Beliefs) {
        beliefs.set("hungry", !world.fed);
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();

    let move_to_bush: Arc<dyn ActionTemplate<Meadow>> =
        Arc::new(MoveToTemplate::new(ActionKey("MoveToBush"), BUSH, 0.1));
    let harvest: Arc<dyn ActionTemplate<Meadow>> = Arc::new(Harvest);
    let eat: Arc<dyn ActionTemplate<Meadow>> = Arc::new(Eat);
    let planner = GoapPlanner::new(
        vec![
            GoapAction::new(move_to_bush, 2).adds(AT_BUSH),
            GoapAction::new(harvest, 1).requires(AT_BUSH).adds(HAS_BERRIES),
            GoapAction::new(eat, 1).requires(HAS_BERRIES).adds(FED),
        ],
        |world: &Meadow, agent, _beliefs| facts(world, agent),
    )
    .with_goal(EAT, FED);

    let trace = Rc::new(RefCell::new(TraceLog::default()));
    let mut controller = ExecutionController::new(FORAGER)
        .with_config(ControllerConfig::default())?
        .with_planner(planner)
        .with_perception(Hunger)
        .with_goal(DynamicGoal::new(EAT, |beliefs| {
            if beliefs.get("hungry").unwrap_or(true) {
                (2.0, false)
            } else {
                (0.0, false)
            }
        }))
        .with_trace_sink(Rc::clone(&trace));

    let mut meadow = Meadow::default();
    meadow.mover.spawn(FORAGER, Vec2::ZERO, 2.0);
    controller.initialize(&meadow);

    let mut ctx = TickContext::new(0, 0.1);
    for _ in 0..80 {
        meadow.mover.step(ctx.dt_seconds);
        controller.tick(&ctx, &mut meadow);
        if meadow.fed && controller.current_plan().is_none() {
            break;
        }
        ctx = ctx.next();
    }

    tracing::info!(
        ticks = ctx.tick + 1,
        fed = meadow.fed,
        berries_left = meadow.basket,
        "Forager finished"
    );
    for event in &trace.borrow().events {
        println!("[{:>3}] {:<22} {}", event.tick, event.tag, event.detail);
    }
    Ok(())
}

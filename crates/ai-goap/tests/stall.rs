mod common;

use std::cell::RefCell;
use std::rc::Rc;

use ai_core::{Goal, GoalKey, PlanSignature};
use ai_goap::{ControllerConfig, ExecutionController};
use ai_nav::{StuckWatchdogConfig, Vec2};
use ai_tools::TraceLog;
use common::{ScriptedPlanner, ScriptedTemplate, Sim, AGENT};

fn stalling_sim(destination: Option<Vec2>) -> (Sim, Rc<RefCell<TraceLog>>) {
    let walk = match destination {
        Some(to) => ScriptedTemplate::endless("Walk").moving_to(to),
        None => ScriptedTemplate::endless("Walk"),
    };
    let config = ControllerConfig {
        watchdog: StuckWatchdogConfig {
            stall_seconds: 0.5,
            min_progress: 0.1,
            cooldown_seconds: 1.0,
        },
        ..ControllerConfig::default()
    };
    let trace = Rc::new(RefCell::new(TraceLog::default()));
    let controller = ExecutionController::new(AGENT)
        .with_config(config)
        .expect("valid config")
        .with_trace_sink(Rc::clone(&trace))
        .with_planner(ScriptedPlanner::new().with_recipe("Travel", vec![walk.shared()]))
        .with_goal(Goal::new(GoalKey("Travel"), 1.0));
    (Sim::new(controller, 0.25), trace)
}

#[test]
fn stalled_movement_aborts_the_plan_and_halts() {
    let (mut sim, trace) = stalling_sim(Some(Vec2::new(10.0, 0.0)));
    sim.world.mover.set_obstructed(AGENT, true);

    // adopt, start, baseline, then 0.5s without progress.
    sim.steps(5);

    assert_eq!(trace.borrow().count("goap.stall"), 1);
    assert_eq!(sim.world.count("stop:Walk"), 1);
    assert_eq!(sim.world.count("complete:Walk"), 0);
    assert!(sim.world.mover.is_halted(AGENT));
    assert!(!sim.world.mover.has_path(AGENT));

    let signature = PlanSignature::new("Travel", ["Walk"]);
    assert_eq!(sim.controller.loop_detector().failure_count(&signature), 1);
    // Stalls do not remember the goal.
    assert!(sim.controller.last_goal().is_none());

    // The goal is planned again in the same tick; the next pick unhalts.
    assert!(sim.controller.current_plan().is_some());
    sim.step();
    assert!(!sim.world.mover.is_halted(AGENT));
    assert_eq!(sim.world.count("start:Walk"), 2);
}

#[test]
fn cooldown_delays_the_next_stall_report() {
    let (mut sim, trace) = stalling_sim(Some(Vec2::new(10.0, 0.0)));
    sim.world.mover.set_obstructed(AGENT, true);

    sim.steps(5);
    assert_eq!(trace.borrow().count("goap.stall"), 1);

    // Restart, 1.0s of cooldown, a fresh baseline, then another 0.5s.
    sim.steps(7);
    assert_eq!(trace.borrow().count("goap.stall"), 1);
    sim.step();
    assert_eq!(trace.borrow().count("goap.stall"), 2);
}

#[test]
fn moving_agent_is_never_reported() {
    let (mut sim, trace) = stalling_sim(Some(Vec2::new(100.0, 0.0)));

    sim.steps(60);
    assert_eq!(trace.borrow().count("goap.stall"), 0);
    assert_eq!(sim.world.count("stop:Walk"), 0);
}

#[test]
fn watchdog_is_idle_without_a_path() {
    let (mut sim, trace) = stalling_sim(None);
    sim.world.mover.set_obstructed(AGENT, true);

    sim.steps(60);
    assert_eq!(trace.borrow().count("goap.stall"), 0);
    assert!(!sim.world.mover.is_halted(AGENT));
}

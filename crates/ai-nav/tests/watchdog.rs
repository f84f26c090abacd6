use ai_core::{WorldMut, WorldView};
use ai_nav::{
    LinearMover, MovementView, MovementWorld, StuckWatchdog, StuckWatchdogConfig, Vec2, Watchdog,
};

const AGENT: u64 = 1;

#[derive(Default)]
struct Field {
    mover: LinearMover<u64>,
}

impl WorldView for Field {
    type Agent = u64;
}

impl WorldMut for Field {}

impl MovementView for Field {
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

impl MovementWorld for Field {
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

fn watchdog() -> StuckWatchdog {
    StuckWatchdog::new(StuckWatchdogConfig {
        stall_seconds: 1.0,
        min_progress: 0.1,
        cooldown_seconds: 0.5,
    })
}

fn field_heading_east() -> Field {
    let mut field = Field::default();
    field.mover.spawn(AGENT, Vec2::ZERO, 1.0);
    assert!(field.set_destination(AGENT, Vec2::new(100.0, 0.0)));
    field
}

/// Step the backend and feed the watchdog; returns the tick a stall fired on.
fn run(field: &mut Field, dog: &mut StuckWatchdog, ticks: u32, dt: f32) -> Option<u32> {
    for tick in 0..ticks {
        field.mover.step(dt);
        if Watchdog::<Field>::update(dog, field, AGENT, dt).is_some() {
            return Some(tick);
        }
    }
    None
}

#[test]
fn moving_agent_never_stalls() {
    let mut field = field_heading_east();
    let mut dog = watchdog();
    Watchdog::<Field>::initialize(&mut dog, field.position(AGENT));

    assert_eq!(run(&mut field, &mut dog, 50, 0.2), None);
}

#[test]
fn obstructed_agent_stalls_after_threshold() {
    let mut field = field_heading_east();
    field.mover.set_obstructed(AGENT, true);
    let mut dog = watchdog();
    Watchdog::<Field>::on_new_action(&mut dog, field.position(AGENT));

    // First update establishes the distance baseline, then 1.0s of no progress.
    let fired = run(&mut field, &mut dog, 20, 0.25).expect("stall");
    assert_eq!(fired, 4);
}

#[test]
fn cooldown_suppresses_reports() {
    let mut field = field_heading_east();
    field.mover.set_obstructed(AGENT, true);
    let mut dog = watchdog();
    Watchdog::<Field>::on_new_action(&mut dog, field.position(AGENT));

    assert!(run(&mut field, &mut dog, 20, 0.25).is_some());
    Watchdog::<Field>::start_cooldown(&mut dog);
    assert_eq!(dog.cooldown_remaining(), 0.5);

    // 0.5s cooldown, then 1.0s without progress.
    let fired = run(&mut field, &mut dog, 20, 0.25).expect("stall after cooldown");
    assert_eq!(fired, 5);
}

#[test]
fn pending_path_resets_stall_timer() {
    let mut field = Field {
        mover: LinearMover::new().with_path_latency(1000),
    };
    field.mover.spawn(AGENT, Vec2::ZERO, 1.0);
    assert!(field.set_destination(AGENT, Vec2::new(5.0, 0.0)));
    assert!(field.path_pending(AGENT));

    let mut dog = watchdog();
    Watchdog::<Field>::on_new_action(&mut dog, field.position(AGENT));
    assert_eq!(run(&mut field, &mut dog, 40, 0.25), None);
    assert_eq!(dog.stalled_for(), 0.0);
}

#[test]
fn new_action_rebases_progress() {
    let mut field = field_heading_east();
    field.mover.set_obstructed(AGENT, true);
    let mut dog = watchdog();
    Watchdog::<Field>::on_new_action(&mut dog, field.position(AGENT));

    assert_eq!(run(&mut field, &mut dog, 3, 0.25), None);
    assert!(dog.stalled_for() > 0.0);

    Watchdog::<Field>::on_new_action(&mut dog, field.position(AGENT));
    assert_eq!(dog.stalled_for(), 0.0);
}

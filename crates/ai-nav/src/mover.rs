use std::collections::BTreeMap;

use ai_core::AgentId;

use crate::Vec2;

const ARRIVAL_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub speed: f32,
    pub destination: Option<Vec2>,
    pub halted: bool,
    /// An obstructed body keeps its path but cannot advance along it.
    pub obstructed: bool,
    /// Ticks until a freshly requested path becomes active.
    pub pending_ticks: u32,
}

/// Reference movement backend: straight-line travel with no obstacles.
///
/// Worlds embed one and forward their `MovementView`/`MovementWorld` calls to
/// it. `step` advances every body; arrival clears the path.
#[derive(Debug, Clone)]
pub struct LinearMover<A: AgentId> {
    bodies: BTreeMap<A, Body>,
    path_latency_ticks: u32,
}

impl<A: AgentId> Default for LinearMover<A> {
    fn default() -> Self {
        Self {
            bodies: BTreeMap::new(),
            path_latency_ticks: 0,
        }
    }
}

impl<A: AgentId> LinearMover<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newly requested paths stay pending for `ticks` steps.
    pub fn with_path_latency(mut self, ticks: u32) -> Self {
        self.path_latency_ticks = ticks;
        self
    }

    pub fn spawn(&mut self, agent: A, position: Vec2, speed: f32) {
        self.bodies.insert(
            agent,
            Body {
                position,
                speed: speed.max(0.0),
                destination: None,
                halted: false,
                obstructed: false,
                pending_ticks: 0,
            },
        );
    }

    pub fn body(&self, agent: A) -> Option<&Body> {
        self.bodies.get(&agent)
    }

    pub fn set_obstructed(&mut self, agent: A, obstructed: bool) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.obstructed = obstructed;
        }
    }

    pub fn position(&self, agent: A) -> Option<Vec2> {
        self.bodies.get(&agent).map(|b| b.position)
    }

    pub fn has_path(&self, agent: A) -> bool {
        self.bodies
            .get(&agent)
            .is_some_and(|b| b.destination.is_some() && b.pending_ticks == 0)
    }

    pub fn path_pending(&self, agent: A) -> bool {
        self.bodies
            .get(&agent)
            .is_some_and(|b| b.destination.is_some() && b.pending_ticks > 0)
    }

    pub fn remaining_distance(&self, agent: A) -> f32 {
        match self.bodies.get(&agent) {
            Some(Body {
                position,
                destination: Some(dest),
                ..
            }) => position.distance(*dest),
            _ => 0.0,
        }
    }

    pub fn is_halted(&self, agent: A) -> bool {
        self.bodies.get(&agent).is_some_and(|b| b.halted)
    }

    pub fn reset_path(&mut self, agent: A) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.destination = None;
            body.pending_ticks = 0;
        }
    }

    pub fn set_destination(&mut self, agent: A, destination: Vec2) -> bool {
        let latency = self.path_latency_ticks;
        let Some(body) = self.bodies.get_mut(&agent) else {
            return false;
        };
        body.destination = Some(destination);
        body.pending_ticks = latency;
        true
    }

    pub fn set_halted(&mut self, agent: A, halted: bool) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.halted = halted;
        }
    }

    pub fn step(&mut self, dt_seconds: f32) {
        let dt = dt_seconds.max(0.0);
        for body in self.bodies.values_mut() {
            if body.pending_ticks > 0 {
                body.pending_ticks -= 1;
                continue;
            }
            let Some(dest) = body.destination else {
                continue;
            };
            if body.halted || body.obstructed {
                continue;
            }
            body.position = body.position.move_towards(dest, body.speed * dt);
            if body.position.distance(dest) <= ARRIVAL_EPSILON {
                body.position = dest;
                body.destination = None;
            }
        }
    }
}

use ai_core::{Action, ActionKey, ActionTemplate, AgentId, Beliefs, TickContext};

use crate::{MovementWorld, Vec2};

/// Prototype for [`MoveToAction`]: travel to a fixed point.
#[derive(Debug, Clone)]
pub struct MoveToTemplate {
    key: ActionKey,
    destination: Vec2,
    arrival_distance: f32,
}

impl MoveToTemplate {
    pub fn new(key: ActionKey, destination: Vec2, arrival_distance: f32) -> Self {
        Self {
            key,
            destination,
            arrival_distance: arrival_distance.max(0.0),
        }
    }

    pub fn destination(&self) -> Vec2 {
        self.destination
    }
}

impl<W> ActionTemplate<W> for MoveToTemplate
where
    W: MovementWorld + 'static,
{
    fn key(&self) -> ActionKey {
        self.key
    }

    fn create(&self, agent: W::Agent) -> Box<dyn Action<W>> {
        Box::new(MoveToAction {
            key: self.key,
            agent,
            destination: self.destination,
            arrival_distance: self.arrival_distance,
            phase: Phase::Requesting,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Requesting,
    Travelling,
    Arrived,
}

#[derive(Debug, Clone)]
pub struct MoveToAction<A: AgentId> {
    key: ActionKey,
    agent: A,
    destination: Vec2,
    arrival_distance: f32,
    phase: Phase,
}

impl<A: AgentId> MoveToAction<A> {
    fn arrived<W>(&self, world: &W) -> bool
    where
        W: MovementWorld<Agent = A>,
    {
        world
            .position(self.agent)
            .is_some_and(|p| p.distance(self.destination) <= self.arrival_distance)
    }

    fn request<W>(&mut self, world: &mut W)
    where
        W: MovementWorld<Agent = A>,
    {
        if world.set_destination(self.agent, self.destination) {
            self.phase = Phase::Travelling;
        }
    }
}

impl<W> Action<W> for MoveToAction<W::Agent>
where
    W: MovementWorld + 'static,
{
    fn key(&self) -> ActionKey {
        self.key
    }

    fn can_perform(&self, _ctx: &TickContext, world: &W, _beliefs: &Beliefs) -> bool {
        world.position(self.agent).is_some()
    }

    fn is_complete(&self) -> bool {
        self.phase == Phase::Arrived
    }

    fn on_start(&mut self, _ctx: &TickContext, world: &mut W, _beliefs: &mut Beliefs) {
        if self.arrived(&*world) {
            self.phase = Phase::Arrived;
            return;
        }
        self.request(world);
    }

    fn on_update(&mut self, _ctx: &TickContext, world: &mut W, _beliefs: &mut Beliefs) {
        if self.arrived(&*world) {
            self.phase = Phase::Arrived;
            return;
        }

        match self.phase {
            Phase::Requesting => self.request(world),
            Phase::Travelling => {
                // Path dropped without arrival (e.g. reset by the backend).
                if !world.has_path(self.agent) && !world.path_pending(self.agent) {
                    self.phase = Phase::Requesting;
                }
            }
            Phase::Arrived => {}
        }
    }

    fn on_stop(&mut self, _ctx: &TickContext, world: &mut W, _beliefs: &mut Beliefs) {
        if self.phase != Phase::Arrived {
            world.reset_path(self.agent);
        }
    }
}

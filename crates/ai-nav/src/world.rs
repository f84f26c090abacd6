use ai_core::{WorldMut, WorldView};

use crate::Vec2;

/// Path-state queries a movement backend answers for an agent.
///
/// The controller never owns the backend; it only reads these and issues the
/// commands in [`MovementWorld`].
pub trait MovementView: WorldView {
    fn position(&self, agent: Self::Agent) -> Option<Vec2>;

    /// True while the agent has an active path it is following.
    fn has_path(&self, agent: Self::Agent) -> bool;

    /// True while a requested path is still being computed.
    fn path_pending(&self, agent: Self::Agent) -> bool;

    /// Distance left along the active path; `0.0` without one.
    fn remaining_distance(&self, agent: Self::Agent) -> f32;
}

pub trait MovementWorld: WorldMut + MovementView {
    fn reset_path(&mut self, agent: Self::Agent);

    /// Request a path to `destination`. Returns false if the backend refused.
    fn set_destination(&mut self, agent: Self::Agent, destination: Vec2) -> bool;

    fn set_halted(&mut self, agent: Self::Agent, halted: bool);
}

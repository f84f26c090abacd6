//! Deterministic, engine-agnostic agent kernel primitives.
//!
//! Actions, goals and plans as consumed by an execution controller, plus the
//! clock and belief store every agent carries.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod beliefs;
pub mod clock;
pub mod goal;
pub mod plan;
pub mod tick;
pub mod world;

pub use action::{Action, ActionKey, ActionRuntime, ActionTemplate, StartOutcome};
pub use beliefs::{Beliefs, Perception};
pub use clock::{Clock, ManualClock, SimClock, WallClock};
pub use goal::{DynamicGoal, Goal, GoalKey, GoalTemplate};
pub use plan::{Plan, PlanSignature};
pub use tick::TickContext;
pub use world::{AgentId, WorldMut, WorldView};

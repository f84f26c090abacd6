//! Movement primitives consumed by agent controllers: the path-state backend
//! contract, stall detection, a reference straight-line backend, and a
//! reference move-to behavior.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod actions;
pub mod math;
pub mod mover;
pub mod watchdog;
pub mod world;

pub use actions::{MoveToAction, MoveToTemplate};
pub use math::Vec2;
pub use mover::{Body, LinearMover};
pub use watchdog::{StallEvent, StuckWatchdog, StuckWatchdogConfig, Watchdog};
pub use world::{MovementView, MovementWorld};

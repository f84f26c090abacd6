//! GOAP agent execution controller.
//!
//! [`ExecutionController`] drives one agent through goal arbitration, plan
//! acquisition and sequential action execution, recovering from precondition
//! failures and movement stalls. Plans that keep failing are damped by the
//! [`FailureLoopDetector`]. [`GoapPlanner`] is a deterministic reference
//! [`Planner`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod arbitration;
pub mod config;
pub mod controller;
pub mod history;
pub mod loop_detector;
pub mod planner;
pub mod resume;

pub use arbitration::{eligible_goals, priority_threshold};
pub use config::{CommitmentRamp, ConfigError, ControllerConfig, LoopDetectorConfig};
pub use controller::ExecutionController;
pub use history::ActionHistory;
pub use loop_detector::FailureLoopDetector;
pub use planner::{GoapAction, GoapPlanner, GoapPlannerConfig, GoapState, PlanRequest, Planner};
pub use resume::{InterruptStack, NoResume, PlanResume};

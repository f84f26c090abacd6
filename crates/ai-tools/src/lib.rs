//! Tooling primitives for deterministic agent controllers.
//!
//! Engine-agnostic trace events and sinks. Controllers emit a `TraceEvent` per
//! state transition; tests and debug tooling collect them.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{FanoutTraceSink, NullTraceSink, TraceEvent, TraceLog, TraceSink};

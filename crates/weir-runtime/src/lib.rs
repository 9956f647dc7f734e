#![forbid(unsafe_code)]
//! weir-runtime: physical-plan types and the runtime optimization passes
//! that rewrite them from live metric data.
//!
//! Design:
//! - Stages and stage edges reuse the core graph container through its
//!   vertex/edge traits, so plan rebuilds go through the validated builder.
//! - Runtime passes are handed a borrowed plan and return a rewritten one;
//!   failures leave the running plan untouched.
//! - The driver wires metric messages to passes via the event-handler ids
//!   each pass declares; dispatch itself lives with the embedding runtime.

pub mod config;
pub mod error;
pub mod id;
pub mod key_range;
pub mod message;
pub mod pass;
pub mod plan;
pub mod skew;

pub use error::{Error, Result};
pub use key_range::HashRange;
pub use pass::RuntimePass;
pub use plan::{PhysicalPlan, Stage, StageDag, StageEdge};
pub use skew::{DataSkewPass, SkewMetric};

//! Core scheduling simulation for jobsim
//!
//! This crate provides the process model, the five scheduling policies
//! (FCFS, SJF, Round Robin, Priority and the AI hybrid) and the metrics
//! derived from a finished schedule. All time is a logical counter.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod process;
pub mod result;

// Re-export core types
pub use config::{EngineConfig, IdleStrategy};
pub use engine::SchedulerEngine;
pub use error::{Result, SchedError};
pub use metrics::MetricsCalculator;
pub use policy::{Policy, PolicyKind, DEFAULT_QUANTUM};
pub use process::{validate_processes, Pid, ProcessRecord, Ticks};
pub use result::{ExecutionInterval, SchedulingResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        EngineConfig, Policy, PolicyKind, ProcessRecord, Result, SchedError, SchedulerEngine,
        SchedulingResult,
    };
}

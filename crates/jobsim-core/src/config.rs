//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::policy::DEFAULT_QUANTUM;

/// How the simulation clock moves while no process is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdleStrategy {
    /// Advance one time unit per idle step
    Tick,
    /// Jump straight to the earliest pending arrival
    #[default]
    JumpToNextArrival,
}

/// Configuration for [`crate::SchedulerEngine`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Quantum used by `compare` and `Policy::RoundRobin` defaults
    pub default_quantum: u64,
    /// Idle clock handling
    pub idle_strategy: IdleStrategy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_quantum: DEFAULT_QUANTUM,
            idle_strategy: IdleStrategy::default(),
        }
    }
}

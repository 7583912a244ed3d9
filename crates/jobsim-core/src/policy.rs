//! Scheduling policy selectors

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SchedError;

/// Default Round Robin time quantum
pub const DEFAULT_QUANTUM: u64 = 2;

/// Which policy produced a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// First come, first served
    Fcfs,
    /// Shortest job first, non-preemptive
    Sjf,
    /// Round Robin with a fixed quantum
    #[serde(rename = "rr", alias = "round-robin")]
    RoundRobin,
    /// Priority, non-preemptive
    Priority,
    /// Composite score over predicted burst times
    #[serde(rename = "ai", alias = "ai-hybrid")]
    AiHybrid,
}

impl PolicyKind {
    /// Every policy, in the order `compare` runs them
    pub const ALL: [PolicyKind; 5] = [
        Self::Fcfs,
        Self::Sjf,
        Self::RoundRobin,
        Self::Priority,
        Self::AiHybrid,
    ];

    /// Whether the policy can interrupt a running process
    #[must_use]
    pub fn is_preemptive(self) -> bool {
        matches!(self, Self::RoundRobin)
    }

    /// Short lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fcfs => "fcfs",
            Self::Sjf => "sjf",
            Self::RoundRobin => "rr",
            Self::Priority => "priority",
            Self::AiHybrid => "ai",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fcfs" => Ok(Self::Fcfs),
            "sjf" => Ok(Self::Sjf),
            "rr" | "round-robin" | "roundrobin" => Ok(Self::RoundRobin),
            "priority" => Ok(Self::Priority),
            "ai" | "ai-hybrid" => Ok(Self::AiHybrid),
            other => Err(SchedError::InvalidInput(format!(
                "unknown policy: {other}"
            ))),
        }
    }
}

/// A fully parameterised policy invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum Policy {
    /// First come, first served
    Fcfs,
    /// Shortest job first
    Sjf,
    /// Round Robin
    #[serde(rename = "rr", alias = "round-robin")]
    RoundRobin {
        /// Maximum slice length
        quantum: u64,
    },
    /// Priority
    Priority,
    /// AI hybrid with one predicted burst time per process
    #[serde(rename = "ai", alias = "ai-hybrid")]
    AiHybrid {
        /// Predicted burst times, in input order
        predictions: Vec<f64>,
    },
}

impl Policy {
    /// The kind of this invocation
    #[must_use]
    pub fn kind(&self) -> PolicyKind {
        match self {
            Self::Fcfs => PolicyKind::Fcfs,
            Self::Sjf => PolicyKind::Sjf,
            Self::RoundRobin { .. } => PolicyKind::RoundRobin,
            Self::Priority => PolicyKind::Priority,
            Self::AiHybrid { .. } => PolicyKind::AiHybrid,
        }
    }
}

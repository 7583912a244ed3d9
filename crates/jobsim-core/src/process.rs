//! Process records shared by every scheduling policy

use serde::{Deserialize, Serialize};

use crate::{Result, SchedError};

/// Process identifier
pub type Pid = u32;

/// Logical simulation time, in abstract time units
pub type Ticks = u64;

/// A single process: static inputs plus the timings a policy derives for it.
///
/// The derived fields start at zero and are only written by the engine while
/// it simulates a private copy of the record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    /// Process identifier
    pub id: Pid,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Time the process becomes ready
    pub arrival_time: Ticks,
    /// Total CPU demand
    pub burst_time: Ticks,
    /// Lower value means more urgent
    pub priority: u32,
    /// Memory footprint, used as a prediction and ranking feature
    #[serde(default)]
    pub memory_required: u64,
    /// Static I/O operation count, used as a prediction and ranking feature
    #[serde(default)]
    pub io_operations: u32,

    /// CPU time still owed (preemptive policies only)
    #[serde(default)]
    pub remaining_time: Ticks,
    /// Time spent ready but not running
    #[serde(default)]
    pub waiting_time: Ticks,
    /// Completion time minus arrival time
    #[serde(default)]
    pub turnaround_time: Ticks,
    /// Time the last slice finished
    #[serde(default)]
    pub completion_time: Ticks,
    /// Time of first dispatch
    #[serde(default)]
    pub start_time: Ticks,
}

impl ProcessRecord {
    /// Create a process with the given static inputs and no memory or I/O load
    #[must_use]
    pub fn new(id: Pid, arrival_time: Ticks, burst_time: Ticks, priority: u32) -> Self {
        Self {
            id,
            name: format!("P{id}"),
            arrival_time,
            burst_time,
            priority,
            ..Self::default()
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the memory requirement
    #[must_use]
    pub fn with_memory(mut self, memory_required: u64) -> Self {
        self.memory_required = memory_required;
        self
    }

    /// Set the I/O operation count
    #[must_use]
    pub fn with_io(mut self, io_operations: u32) -> Self {
        self.io_operations = io_operations;
        self
    }

    /// Feature vector used by the burst-time predictor:
    /// `[arrival, priority, memory, io_ops]`
    #[must_use]
    pub fn features(&self) -> [f64; 4] {
        [
            self.arrival_time as f64,
            f64::from(self.priority),
            self.memory_required as f64,
            f64::from(self.io_operations),
        ]
    }

    /// Check the static inputs a policy relies on
    pub fn validate(&self) -> Result<()> {
        if self.burst_time == 0 {
            return Err(SchedError::InvalidInput(format!(
                "process {} has a burst time of 0",
                self.id
            )));
        }
        if self.priority == 0 {
            return Err(SchedError::InvalidInput(format!(
                "process {} has a priority of 0",
                self.id
            )));
        }
        Ok(())
    }

    /// Clear every derived field
    pub(crate) fn reset_derived(&mut self) {
        self.remaining_time = 0;
        self.waiting_time = 0;
        self.turnaround_time = 0;
        self.completion_time = 0;
        self.start_time = 0;
    }

    /// Record a non-preemptive dispatch at `now`; returns the completion time
    pub(crate) fn run_to_completion(&mut self, now: Ticks) -> Ticks {
        self.start_time = now;
        self.waiting_time = now - self.arrival_time;
        self.completion_time = now + self.burst_time;
        self.turnaround_time = self.completion_time - self.arrival_time;
        self.completion_time
    }

    /// Record completion of a preemptively scheduled process at `now`
    pub(crate) fn finish_at(&mut self, now: Ticks) {
        self.completion_time = now;
        self.turnaround_time = now - self.arrival_time;
        self.waiting_time = self.turnaround_time - self.burst_time;
    }
}

/// Validate a whole process set
pub fn validate_processes(processes: &[ProcessRecord]) -> Result<()> {
    if processes.is_empty() {
        return Err(SchedError::InvalidInput(
            "process set is empty".to_string(),
        ));
    }
    processes.iter().try_for_each(ProcessRecord::validate)
}

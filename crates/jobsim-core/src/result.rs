//! Schedules handed back to callers

use serde::{Deserialize, Serialize};

use crate::{Pid, PolicyKind, ProcessRecord, Ticks};

/// One contiguous stretch of CPU time given to a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionInterval {
    /// Process that ran
    pub process_id: Pid,
    /// Slice start
    pub start_time: Ticks,
    /// Slice end, always after `start_time`
    pub end_time: Ticks,
}

impl ExecutionInterval {
    /// Create an interval
    #[must_use]
    pub fn new(process_id: Pid, start_time: Ticks, end_time: Ticks) -> Self {
        debug_assert!(end_time > start_time);
        Self {
            process_id,
            start_time,
            end_time,
        }
    }

    /// Length of the slice
    #[must_use]
    pub fn duration(&self) -> Ticks {
        self.end_time - self.start_time
    }
}

/// Immutable snapshot of a finished schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingResult {
    /// Policy that produced the schedule
    pub policy: PolicyKind,
    /// Processes with their derived timings
    pub processes: Vec<ProcessRecord>,
    /// Mean waiting time
    pub avg_waiting_time: f64,
    /// Mean turnaround time
    pub avg_turnaround_time: f64,
    /// Busy share of the makespan, in percent
    pub cpu_utilization: f64,
    /// Processes completed per time unit
    pub throughput: f64,
    /// Execution timeline in dispatch order
    #[serde(rename = "ganttChart", alias = "intervals")]
    pub intervals: Vec<ExecutionInterval>,
}

impl SchedulingResult {
    /// Largest completion time across all processes
    #[must_use]
    pub fn makespan(&self) -> Ticks {
        self.processes
            .iter()
            .map(|p| p.completion_time)
            .max()
            .unwrap_or(0)
    }

    /// Look up a finished process by id
    #[must_use]
    pub fn process(&self, id: Pid) -> Option<&ProcessRecord> {
        self.processes.iter().find(|p| p.id == id)
    }

    /// Intervals belonging to one process
    pub fn intervals_for(&self, id: Pid) -> impl Iterator<Item = &ExecutionInterval> {
        self.intervals.iter().filter(move |i| i.process_id == id)
    }

    /// Total CPU time a process received
    #[must_use]
    pub fn cpu_time_of(&self, id: Pid) -> Ticks {
        self.intervals_for(id).map(ExecutionInterval::duration).sum()
    }

    /// Process ids in the order they were first dispatched
    #[must_use]
    pub fn dispatch_order(&self) -> Vec<Pid> {
        let mut order = Vec::new();
        for interval in &self.intervals {
            if !order.contains(&interval.process_id) {
                order.push(interval.process_id);
            }
        }
        order
    }
}

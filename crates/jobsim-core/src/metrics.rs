//! Aggregate statistics over a completed schedule

use crate::{ExecutionInterval, PolicyKind, ProcessRecord, Result, SchedError, SchedulingResult};

/// Derives averages, utilisation and throughput from finished processes
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Build a [`SchedulingResult`] from finished processes and their timeline.
    ///
    /// Fails on an empty process set or a zero makespan instead of producing
    /// NaN or infinite metrics.
    pub fn calculate(
        policy: PolicyKind,
        processes: Vec<ProcessRecord>,
        intervals: Vec<ExecutionInterval>,
    ) -> Result<SchedulingResult> {
        if processes.is_empty() {
            return Err(SchedError::InvalidInput(
                "cannot compute metrics for an empty process set".to_string(),
            ));
        }

        let makespan = processes
            .iter()
            .map(|p| p.completion_time)
            .max()
            .unwrap_or(0);
        if makespan == 0 {
            return Err(SchedError::DegenerateState(
                "schedule finished at time 0".to_string(),
            ));
        }

        // totals can exceed u64 even when every completion time fits
        let n = processes.len() as f64;
        let total_waiting: f64 = processes.iter().map(|p| p.waiting_time as f64).sum();
        let total_turnaround: f64 = processes.iter().map(|p| p.turnaround_time as f64).sum();
        let total_burst: f64 = processes.iter().map(|p| p.burst_time as f64).sum();
        let makespan = makespan as f64;

        Ok(SchedulingResult {
            policy,
            avg_waiting_time: total_waiting / n,
            avg_turnaround_time: total_turnaround / n,
            cpu_utilization: total_burst / makespan * 100.0,
            throughput: n / makespan,
            processes,
            intervals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn finished(id: u32, arrival: u64, burst: u64, start: u64) -> ProcessRecord {
        let mut p = ProcessRecord::new(id, arrival, burst, 1);
        p.run_to_completion(start);
        p
    }

    #[test]
    fn test_single_process_full_utilisation() {
        let p = finished(1, 0, 4, 0);
        let result = MetricsCalculator::calculate(
            PolicyKind::Fcfs,
            vec![p],
            vec![ExecutionInterval::new(1, 0, 4)],
        )
        .unwrap();

        assert_relative_eq!(result.cpu_utilization, 100.0);
        assert_relative_eq!(result.throughput, 0.25);
        assert_relative_eq!(result.avg_waiting_time, 0.0);
    }

    #[test]
    fn test_idle_gap_lowers_utilisation() {
        let a = finished(1, 0, 2, 0);
        let b = finished(2, 4, 2, 4);
        let result = MetricsCalculator::calculate(
            PolicyKind::Fcfs,
            vec![a, b],
            vec![ExecutionInterval::new(1, 0, 2), ExecutionInterval::new(2, 4, 6)],
        )
        .unwrap();

        assert_relative_eq!(result.cpu_utilization, 4.0 / 6.0 * 100.0);
        assert_relative_eq!(result.throughput, 2.0 / 6.0);
        assert_eq!(result.makespan(), 6);
    }

    #[test]
    fn test_empty_set_is_invalid_input() {
        let err = MetricsCalculator::calculate(PolicyKind::Sjf, vec![], vec![]).unwrap_err();
        assert!(matches!(err, SchedError::InvalidInput(_)));
    }

    #[test]
    fn test_huge_bursts_do_not_overflow_totals() {
        let procs = vec![
            ProcessRecord::new(1, 0, 1 << 63, 1),
            ProcessRecord::new(2, 0, 1 << 62, 1),
            ProcessRecord::new(3, 0, 1, 1),
        ];
        let result = crate::SchedulerEngine::new(&procs).fcfs().unwrap();

        let makespan = (1u64 << 63) + (1u64 << 62) + 1;
        assert_eq!(result.makespan(), makespan);
        assert_relative_eq!(result.cpu_utilization, 100.0);
        let waits = [0.0, 2f64.powi(63), 2f64.powi(63) + 2f64.powi(62)];
        assert_relative_eq!(result.avg_waiting_time, waits.iter().sum::<f64>() / 3.0);
    }

    #[test]
    fn test_zero_makespan_is_rejected() {
        let p = ProcessRecord::new(1, 0, 3, 1);
        let err = MetricsCalculator::calculate(PolicyKind::Fcfs, vec![p], vec![]).unwrap_err();
        assert!(matches!(err, SchedError::DegenerateState(_)));
    }
}

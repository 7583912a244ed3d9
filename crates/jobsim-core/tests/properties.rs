use approx::assert_relative_eq;
use proptest::prelude::*;

use jobsim_core::{
    EngineConfig, IdleStrategy, PolicyKind, ProcessRecord, SchedulerEngine, SchedulingResult,
};

fn process_set() -> impl Strategy<Value = Vec<ProcessRecord>> {
    prop::collection::vec((0u64..20, 1u64..10, 1u32..=10, 10u64..110, 0u32..5), 1..12).prop_map(
        |rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (arrival, burst, priority, memory, io))| {
                    ProcessRecord::new(i as u32 + 1, arrival, burst, priority)
                        .with_memory(memory)
                        .with_io(io)
                })
                .collect()
        },
    )
}

/// Process sets whose arrival times are pairwise distinct
fn distinct_arrivals() -> impl Strategy<Value = Vec<ProcessRecord>> {
    prop::collection::btree_set(0u64..60, 1..10).prop_flat_map(|arrivals| {
        let n = arrivals.len();
        prop::collection::vec(1u64..10, n).prop_map(move |bursts| {
            arrivals
                .iter()
                .zip(bursts)
                .enumerate()
                .map(|(i, (&arrival, burst))| ProcessRecord::new(i as u32 + 1, arrival, burst, 1))
                .collect::<Vec<_>>()
        })
    })
}

fn all_results(engine: &SchedulerEngine, quantum: u64) -> Vec<SchedulingResult> {
    let predictions: Vec<f64> = engine
        .processes()
        .iter()
        .map(|p| p.burst_time as f64 + 0.4)
        .collect();
    vec![
        engine.fcfs().unwrap(),
        engine.sjf().unwrap(),
        engine.round_robin(quantum).unwrap(),
        engine.priority_scheduling().unwrap(),
        engine.ai_scheduling(&predictions).unwrap(),
    ]
}

fn check_timeline(result: &SchedulingResult) {
    let mut last_end = 0;
    for interval in &result.intervals {
        assert!(interval.end_time > interval.start_time);
        assert!(interval.start_time >= last_end, "overlapping slices");
        last_end = interval.end_time;
    }
    assert_eq!(last_end, result.makespan());
}

proptest! {
    #[test]
    fn averages_match_per_process_sums(procs in process_set(), quantum in 1u64..5) {
        let engine = SchedulerEngine::new(&procs);
        for result in all_results(&engine, quantum) {
            let n = result.processes.len() as f64;
            let waiting: u64 = result.processes.iter().map(|p| p.waiting_time).sum();
            let turnaround: u64 = result.processes.iter().map(|p| p.turnaround_time).sum();
            assert_relative_eq!(result.avg_waiting_time, waiting as f64 / n, epsilon = 1e-9);
            assert_relative_eq!(result.avg_turnaround_time, turnaround as f64 / n, epsilon = 1e-9);
        }
    }

    #[test]
    fn per_process_timings_are_consistent(procs in process_set(), quantum in 1u64..5) {
        let engine = SchedulerEngine::new(&procs);
        for result in all_results(&engine, quantum) {
            check_timeline(&result);
            for p in &result.processes {
                prop_assert_eq!(result.cpu_time_of(p.id), p.burst_time);
                prop_assert_eq!(p.turnaround_time, p.completion_time - p.arrival_time);
                prop_assert_eq!(p.waiting_time, p.turnaround_time - p.burst_time);
                prop_assert!(p.completion_time >= p.arrival_time + p.burst_time);
                prop_assert!(p.start_time >= p.arrival_time);
                if !result.policy.is_preemptive() {
                    prop_assert_eq!(p.completion_time - p.start_time, p.burst_time);
                }
            }
        }
    }

    #[test]
    fn utilisation_and_throughput_are_bounded(procs in process_set(), quantum in 1u64..5) {
        let engine = SchedulerEngine::new(&procs);
        for result in all_results(&engine, quantum) {
            let makespan = result.makespan() as f64;
            prop_assert!(result.cpu_utilization > 0.0);
            prop_assert!(result.cpu_utilization <= 100.0 + 1e-9);
            assert_relative_eq!(
                result.throughput,
                result.processes.len() as f64 / makespan,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn round_robin_slices_never_exceed_quantum(procs in process_set(), quantum in 1u64..6) {
        let result = SchedulerEngine::new(&procs).round_robin(quantum).unwrap();
        prop_assert_eq!(result.policy, PolicyKind::RoundRobin);
        for interval in &result.intervals {
            prop_assert!(interval.duration() <= quantum);
        }
        for p in &procs {
            prop_assert_eq!(result.cpu_time_of(p.id), p.burst_time);
        }
    }

    #[test]
    fn fcfs_ignores_input_order(procs in distinct_arrivals(), rotate in 0usize..10) {
        let mut reordered = procs.clone();
        reordered.reverse();
        let len = reordered.len();
        reordered.rotate_left(rotate % len);

        let a = SchedulerEngine::new(&procs).fcfs().unwrap();
        let b = SchedulerEngine::new(&reordered).fcfs().unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn idle_strategies_agree(procs in process_set(), quantum in 1u64..5) {
        let jump = SchedulerEngine::new(&procs);
        let tick = SchedulerEngine::with_config(
            &procs,
            EngineConfig { idle_strategy: IdleStrategy::Tick, ..EngineConfig::default() },
        );
        prop_assert_eq!(all_results(&jump, quantum), all_results(&tick, quantum));
    }
}

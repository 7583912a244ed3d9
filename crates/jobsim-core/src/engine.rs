//! The scheduling engine: five policies over a private copy of the input

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::config::{EngineConfig, IdleStrategy};
use crate::process::validate_processes;
use crate::{
    ExecutionInterval, MetricsCalculator, Policy, PolicyKind, ProcessRecord, Result, SchedError,
    SchedulingResult, Ticks,
};

/// Weights of the AI-hybrid composite score: priority, burst, memory, I/O
const AI_SCORE_WEIGHTS: [f64; 4] = [0.4, 0.3, 0.2, 0.1];

/// Simulates scheduling policies over a fixed set of processes.
///
/// The engine owns its own copy of the records. Every policy call clones that
/// copy again, so calls never observe each other and the caller's records are
/// never touched.
#[derive(Debug, Clone)]
pub struct SchedulerEngine {
    processes: Vec<ProcessRecord>,
    config: EngineConfig,
}

impl SchedulerEngine {
    /// Create an engine with the default configuration
    #[must_use]
    pub fn new(processes: &[ProcessRecord]) -> Self {
        Self::with_config(processes, EngineConfig::default())
    }

    /// Create an engine with an explicit configuration
    #[must_use]
    pub fn with_config(processes: &[ProcessRecord], config: EngineConfig) -> Self {
        Self {
            processes: processes.to_vec(),
            config,
        }
    }

    /// The stored input records
    #[must_use]
    pub fn processes(&self) -> &[ProcessRecord] {
        &self.processes
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// First come, first served
    pub fn fcfs(&self) -> Result<SchedulingResult> {
        let mut procs = self.working_copy()?;
        // stable: equal arrivals keep input order
        procs.sort_by_key(|p| p.arrival_time);

        let mut clock: Ticks = 0;
        let mut intervals = Vec::with_capacity(procs.len());
        for p in &mut procs {
            clock = clock.max(p.arrival_time);
            let start = clock;
            advance(clock, p.burst_time)?;
            clock = p.run_to_completion(start);
            trace!(pid = p.id, start, end = clock, "dispatch");
            intervals.push(ExecutionInterval::new(p.id, start, clock));
        }

        self.finish(PolicyKind::Fcfs, procs, intervals)
    }

    /// Shortest job first, non-preemptive
    pub fn sjf(&self) -> Result<SchedulingResult> {
        let procs = self.working_copy()?;
        self.run_non_preemptive(PolicyKind::Sjf, procs, |p| p.burst_time as f64)
    }

    /// Priority, non-preemptive; the numerically smallest priority runs first
    pub fn priority_scheduling(&self) -> Result<SchedulingResult> {
        let procs = self.working_copy()?;
        self.run_non_preemptive(PolicyKind::Priority, procs, |p| f64::from(p.priority))
    }

    /// Round Robin with the given quantum
    pub fn round_robin(&self, quantum: u64) -> Result<SchedulingResult> {
        if quantum == 0 {
            return Err(SchedError::InvalidInput(
                "round robin quantum must be at least 1".to_string(),
            ));
        }

        let mut procs = self.working_copy()?;
        for p in &mut procs {
            p.remaining_time = p.burst_time;
        }

        let n = procs.len();
        let mut queue = VecDeque::with_capacity(n);
        let mut queued = vec![false; n];
        for (i, p) in procs.iter().enumerate() {
            if p.arrival_time == 0 {
                queue.push_back(i);
                queued[i] = true;
            }
        }

        let mut clock: Ticks = 0;
        let mut completed = 0;
        let mut intervals = Vec::new();

        while completed < n {
            let Some(idx) = queue.pop_front() else {
                clock = self.idle_advance(&procs, clock, |i| {
                    procs[i].remaining_time > 0 && !queued[i]
                })?;
                admit_arrivals(&procs, clock, None, &mut queue, &mut queued);
                continue;
            };
            queued[idx] = false;

            let p = &mut procs[idx];
            if p.remaining_time == p.burst_time {
                p.start_time = clock;
            }
            let slice = quantum.min(p.remaining_time);
            let end = advance(clock, slice)?;
            trace!(pid = p.id, start = clock, end, "dispatch");
            intervals.push(ExecutionInterval::new(p.id, clock, end));
            p.remaining_time -= slice;
            clock = end;

            // arrivals during the slice queue ahead of the preempted process
            admit_arrivals(&procs, clock, Some(idx), &mut queue, &mut queued);

            let p = &mut procs[idx];
            if p.remaining_time > 0 {
                queue.push_back(idx);
                queued[idx] = true;
            } else {
                p.finish_at(clock);
                completed += 1;
            }
        }

        self.finish(PolicyKind::RoundRobin, procs, intervals)
    }

    /// AI hybrid: substitute predicted burst times, then dispatch by the
    /// composite score `0.4·priority + 0.3·burst + 0.2·memory + 0.1·io`.
    ///
    /// `predicted_burst_times` must hold one finite value per process, in
    /// input order; each is rounded and must be at least 1.
    pub fn ai_scheduling(&self, predicted_burst_times: &[f64]) -> Result<SchedulingResult> {
        let mut procs = self.working_copy()?;
        if predicted_burst_times.len() != procs.len() {
            return Err(SchedError::InvalidInput(format!(
                "expected {} predicted burst times, got {}",
                procs.len(),
                predicted_burst_times.len()
            )));
        }

        for (p, &predicted) in procs.iter_mut().zip(predicted_burst_times) {
            let rounded = predicted.round();
            if !rounded.is_finite() || rounded < 1.0 || rounded > u64::MAX as f64 {
                return Err(SchedError::InvalidInput(format!(
                    "predicted burst time {predicted} for process {} is not a positive number",
                    p.id
                )));
            }
            p.burst_time = rounded as u64;
        }

        self.run_non_preemptive(PolicyKind::AiHybrid, procs, composite_score)
    }

    /// Run a parameterised policy
    pub fn run(&self, policy: &Policy) -> Result<SchedulingResult> {
        debug!(policy = %policy.kind(), processes = self.processes.len(), "running policy");
        match policy {
            Policy::Fcfs => self.fcfs(),
            Policy::Sjf => self.sjf(),
            Policy::RoundRobin { quantum } => self.round_robin(*quantum),
            Policy::Priority => self.priority_scheduling(),
            Policy::AiHybrid { predictions } => self.ai_scheduling(predictions),
        }
    }

    /// Run every policy, Round Robin with the configured default quantum.
    ///
    /// Results come back in [`PolicyKind::ALL`] order.
    pub fn compare(&self, predicted_burst_times: &[f64]) -> Result<Vec<SchedulingResult>> {
        Ok(vec![
            self.fcfs()?,
            self.sjf()?,
            self.round_robin(self.config.default_quantum)?,
            self.priority_scheduling()?,
            self.ai_scheduling(predicted_burst_times)?,
        ])
    }

    /// Fresh, validated copy with every derived field cleared
    fn working_copy(&self) -> Result<Vec<ProcessRecord>> {
        validate_processes(&self.processes)?;
        let mut procs = self.processes.clone();
        for p in &mut procs {
            p.reset_derived();
        }
        Ok(procs)
    }

    /// Shared loop of SJF, Priority and AI hybrid: at each decision point pick
    /// the ready process with the lowest rank, first one encountered on ties.
    fn run_non_preemptive<F>(
        &self,
        policy: PolicyKind,
        mut procs: Vec<ProcessRecord>,
        rank: F,
    ) -> Result<SchedulingResult>
    where
        F: Fn(&ProcessRecord) -> f64,
    {
        let n = procs.len();
        let mut done = vec![false; n];
        let mut completed = 0;
        let mut clock: Ticks = 0;
        let mut intervals = Vec::with_capacity(n);

        while completed < n {
            let mut best: Option<(usize, f64)> = None;
            for (i, p) in procs.iter().enumerate() {
                if done[i] || p.arrival_time > clock {
                    continue;
                }
                let key = rank(p);
                if best.map_or(true, |(_, best_key)| key < best_key) {
                    best = Some((i, key));
                }
            }

            let Some((idx, _)) = best else {
                clock = self.idle_advance(&procs, clock, |i| !done[i])?;
                continue;
            };

            let p = &mut procs[idx];
            let start = clock;
            advance(clock, p.burst_time)?;
            clock = p.run_to_completion(start);
            trace!(pid = p.id, start, end = clock, "dispatch");
            intervals.push(ExecutionInterval::new(p.id, start, clock));
            done[idx] = true;
            completed += 1;
        }

        self.finish(policy, procs, intervals)
    }

    /// Move the clock forward while nothing is ready.
    ///
    /// `pending` says which processes are still waiting to arrive. Fails if
    /// none of them ever will.
    fn idle_advance<P>(&self, procs: &[ProcessRecord], clock: Ticks, pending: P) -> Result<Ticks>
    where
        P: Fn(usize) -> bool,
    {
        let next_arrival = procs
            .iter()
            .enumerate()
            .filter(|&(i, p)| pending(i) && p.arrival_time > clock)
            .map(|(_, p)| p.arrival_time)
            .min()
            .ok_or_else(|| {
                SchedError::DegenerateState(format!(
                    "ready queue is empty at t={clock} and no pending process can arrive"
                ))
            })?;

        match self.config.idle_strategy {
            IdleStrategy::Tick => advance(clock, 1),
            IdleStrategy::JumpToNextArrival => Ok(next_arrival),
        }
    }

    fn finish(
        &self,
        policy: PolicyKind,
        procs: Vec<ProcessRecord>,
        intervals: Vec<ExecutionInterval>,
    ) -> Result<SchedulingResult> {
        let result = MetricsCalculator::calculate(policy, procs, intervals)?;
        debug!(
            %policy,
            processes = result.processes.len(),
            makespan = result.makespan(),
            avg_waiting = result.avg_waiting_time,
            "schedule complete"
        );
        Ok(result)
    }
}

/// Composite AI-hybrid ranking key; lower dispatches first
fn composite_score(p: &ProcessRecord) -> f64 {
    let [w_priority, w_burst, w_memory, w_io] = AI_SCORE_WEIGHTS;
    w_priority * f64::from(p.priority)
        + w_burst * p.burst_time as f64
        + w_memory * p.memory_required as f64
        + w_io * f64::from(p.io_operations)
}

/// Clock arithmetic that reports overflow instead of wrapping
fn advance(clock: Ticks, by: Ticks) -> Result<Ticks> {
    clock.checked_add(by).ok_or_else(|| {
        SchedError::DegenerateState(format!("simulation clock overflowed at t={clock}"))
    })
}

/// Enqueue every arrived, unfinished, not-yet-queued process in input order
fn admit_arrivals(
    procs: &[ProcessRecord],
    clock: Ticks,
    skip: Option<usize>,
    queue: &mut VecDeque<usize>,
    queued: &mut [bool],
) {
    for (i, p) in procs.iter().enumerate() {
        if Some(i) != skip && !queued[i] && p.remaining_time > 0 && p.arrival_time <= clock {
            queue.push_back(i);
            queued[i] = true;
        }
    }
}

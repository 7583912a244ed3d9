// Command implementations for the jobsim CLI

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

use jobsim_core::{
    EngineConfig, Policy, PolicyKind, ProcessRecord, SchedulerEngine, SchedulingResult,
};
use jobsim_learn::{
    as_engine_predictions, AdvisorConfig, BurstTimePredictor, ModelEvaluation, PredictorConfig,
    PriorityTier, ReinforcementAdvisor,
};

/// Read a JSON array of process records
pub fn load_processes(path: &Path) -> Result<Vec<ProcessRecord>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read process file {}", path.display()))?;
    let processes: Vec<ProcessRecord> =
        serde_json::from_str(&json).context("Failed to parse process records")?;
    info!(count = processes.len(), file = %path.display(), "loaded processes");
    Ok(processes)
}

fn predictor(seed: Option<u64>) -> BurstTimePredictor {
    BurstTimePredictor::with_config(PredictorConfig {
        seed,
        ..PredictorConfig::default()
    })
}

fn predictions_for(processes: &[ProcessRecord], seed: Option<u64>) -> Result<Vec<f64>> {
    let predicted = predictor(seed)
        .predict_burst_times(processes)
        .context("Failed to predict burst times")?;
    Ok(as_engine_predictions(&predicted))
}

/// Run a single policy
pub fn run_policy(
    processes: &[ProcessRecord],
    kind: PolicyKind,
    quantum: u64,
    seed: Option<u64>,
    config: EngineConfig,
) -> Result<SchedulingResult> {
    let policy = match kind {
        PolicyKind::Fcfs => Policy::Fcfs,
        PolicyKind::Sjf => Policy::Sjf,
        PolicyKind::RoundRobin => Policy::RoundRobin { quantum },
        PolicyKind::Priority => Policy::Priority,
        PolicyKind::AiHybrid => Policy::AiHybrid {
            predictions: predictions_for(processes, seed)?,
        },
    };

    SchedulerEngine::with_config(processes, config)
        .run(&policy)
        .with_context(|| format!("{kind} scheduling failed"))
}

/// One line of a policy comparison
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySummary {
    pub policy: PolicyKind,
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    pub cpu_utilization: f64,
    pub throughput: f64,
    pub makespan: u64,
}

impl From<&SchedulingResult> for PolicySummary {
    fn from(result: &SchedulingResult) -> Self {
        Self {
            policy: result.policy,
            avg_waiting_time: result.avg_waiting_time,
            avg_turnaround_time: result.avg_turnaround_time,
            cpu_utilization: result.cpu_utilization,
            throughput: result.throughput,
            makespan: result.makespan(),
        }
    }
}

/// Run every policy and summarise
pub fn compare(
    processes: &[ProcessRecord],
    seed: Option<u64>,
    config: EngineConfig,
) -> Result<Vec<PolicySummary>> {
    let predictions = predictions_for(processes, seed)?;
    let results = SchedulerEngine::with_config(processes, config)
        .compare(&predictions)
        .context("Policy comparison failed")?;
    Ok(results.iter().map(PolicySummary::from).collect())
}

/// Predicted versus actual burst time of one process
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRow {
    pub id: u32,
    pub name: String,
    pub actual: u64,
    pub predicted: u64,
    pub error: i64,
}

/// Predictions plus model accuracy on the file's burst times
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub predictions: Vec<PredictionRow>,
    pub evaluation: ModelEvaluation,
}

/// Predict burst times and evaluate the model against the recorded ones
#[allow(clippy::cast_possible_wrap)]
pub fn predict(processes: &[ProcessRecord], seed: Option<u64>) -> Result<PredictionReport> {
    let mut predictor = predictor(seed);
    let predicted = predictor
        .predict_burst_times(processes)
        .context("Failed to predict burst times")?;
    let evaluation = predictor
        .evaluate_model(processes)
        .context("Failed to evaluate model")?;

    let predictions = processes
        .iter()
        .zip(predicted)
        .map(|(p, predicted)| PredictionRow {
            id: p.id,
            name: p.name.clone(),
            actual: p.burst_time,
            predicted,
            error: predicted as i64 - p.burst_time as i64,
        })
        .collect();

    Ok(PredictionReport {
        predictions,
        evaluation,
    })
}

/// Tier the advisor settled on for one process
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    pub id: u32,
    pub name: String,
    pub tier: PriorityTier,
}

/// Train the advisor on repeated runs of a policy, then ask it greedily
pub fn advise(
    processes: &[ProcessRecord],
    kind: PolicyKind,
    quantum: u64,
    episodes: usize,
    seed: Option<u64>,
    config: EngineConfig,
) -> Result<Vec<Advice>> {
    let result = run_policy(processes, kind, quantum, seed, config)?;

    let mut advisor = ReinforcementAdvisor::with_config(AdvisorConfig {
        seed,
        ..AdvisorConfig::default()
    });
    for episode in 0..episodes {
        let total = advisor.learn_from_result(&result);
        tracing::debug!(episode, reward = total.value(), "advisor episode");
    }

    Ok(processes
        .iter()
        .map(|p| Advice {
            id: p.id,
            name: p.name.clone(),
            tier: advisor.recommend(p),
        })
        .collect())
}

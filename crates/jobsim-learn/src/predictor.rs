//! Burst-time prediction with a bootstrap-aggregated tree ensemble

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use jobsim_core::{ProcessRecord, Result, SchedError};

use crate::forest::{Ensemble, TrainingSample, TreeParams};
use crate::synthetic::SyntheticGenerator;

/// Predictor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Trees per ensemble
    pub num_trees: usize,
    /// Tree growth limits
    #[serde(flatten)]
    pub tree: TreeParams,
    /// Retrain whenever the training set size becomes a multiple of this;
    /// 0 disables online retraining
    pub retrain_interval: usize,
    /// Synthetic samples seeded at construction
    pub synthetic_samples: usize,
    /// Random seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            num_trees: 10,
            tree: TreeParams::default(),
            retrain_interval: 20,
            synthetic_samples: 100,
            seed: None,
        }
    }
}

/// Error summary of a predictor against known burst times
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelEvaluation {
    /// Mean squared error
    pub mse: f64,
    /// Mean absolute error
    pub mae: f64,
}

/// Predicts process burst times from `[arrival, priority, memory, io_ops]`.
///
/// The training set starts with synthetic samples and grows through
/// [`add_training_data`](Self::add_training_data). The ensemble is trained
/// lazily on first prediction.
#[derive(Debug, Clone)]
pub struct BurstTimePredictor<R = StdRng> {
    config: PredictorConfig,
    training_data: Vec<TrainingSample>,
    ensemble: Ensemble,
    rng: R,
}

impl BurstTimePredictor<StdRng> {
    /// Create a predictor with the default configuration and an OS seed
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PredictorConfig::default())
    }

    /// Create a predictor from a configuration, honouring its seed
    #[must_use]
    pub fn with_config(config: PredictorConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self::with_rng(config, rng)
    }

    /// Create a default predictor with a fixed seed
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_config(PredictorConfig {
            seed: Some(seed),
            ..PredictorConfig::default()
        })
    }
}

impl Default for BurstTimePredictor<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> BurstTimePredictor<R> {
    /// Create a predictor drawing all randomness from `rng`
    pub fn with_rng(config: PredictorConfig, mut rng: R) -> Self {
        let training_data = SyntheticGenerator::new().samples(config.synthetic_samples, &mut rng);
        Self {
            config,
            training_data,
            ensemble: Ensemble::default(),
            rng,
        }
    }

    /// Rebuild the ensemble from the current training set
    pub fn train(&mut self) -> Result<()> {
        self.ensemble = Ensemble::train(
            &self.training_data,
            self.config.num_trees,
            &self.config.tree,
            &mut self.rng,
        )?;
        info!(
            trees = self.ensemble.len(),
            samples = self.training_data.len(),
            "burst-time ensemble trained"
        );
        Ok(())
    }

    /// Predicted burst time of one process, at least 1.
    ///
    /// Trains the ensemble first if it has never been trained.
    pub fn predict_burst_time(&mut self, process: &ProcessRecord) -> Result<u64> {
        if self.ensemble.is_empty() {
            debug!("predictor untrained, training before first prediction");
            self.train()?;
        }
        self.ensemble
            .predict(&process.features())
            .ok_or_else(|| SchedError::Training("ensemble has no trees".to_string()))
    }

    /// Predicted burst times, in input order
    pub fn predict_burst_times(&mut self, processes: &[ProcessRecord]) -> Result<Vec<u64>> {
        processes
            .iter()
            .map(|p| self.predict_burst_time(p))
            .collect()
    }

    /// Record an observed burst time.
    ///
    /// The ensemble is retrained whenever the training set size reaches a
    /// multiple of the configured retrain interval.
    pub fn add_training_data(&mut self, process: &ProcessRecord, actual_burst_time: u64) -> Result<()> {
        if actual_burst_time == 0 {
            return Err(SchedError::InvalidInput(format!(
                "observed burst time for process {} must be at least 1",
                process.id
            )));
        }

        self.training_data.push(TrainingSample::new(
            process.features(),
            actual_burst_time as f64,
        ));

        let interval = self.config.retrain_interval;
        if interval > 0 && self.training_data.len() % interval == 0 {
            debug!(samples = self.training_data.len(), "retrain interval reached");
            self.train()?;
        }
        Ok(())
    }

    /// Mean squared and mean absolute error against each process's
    /// `burst_time`
    pub fn evaluate_model(&mut self, test_processes: &[ProcessRecord]) -> Result<ModelEvaluation> {
        if test_processes.is_empty() {
            return Err(SchedError::InvalidInput(
                "cannot evaluate against an empty process set".to_string(),
            ));
        }

        let mut squared = 0.0;
        let mut absolute = 0.0;
        for p in test_processes {
            let error = self.predict_burst_time(p)? as f64 - p.burst_time as f64;
            squared += error * error;
            absolute += error.abs();
        }

        let n = test_processes.len() as f64;
        Ok(ModelEvaluation {
            mse: squared / n,
            mae: absolute / n,
        })
    }

    /// Whether an ensemble is available
    #[must_use]
    pub fn is_trained(&self) -> bool {
        !self.ensemble.is_empty()
    }

    /// Number of training samples held
    #[must_use]
    pub fn training_set_len(&self) -> usize {
        self.training_data.len()
    }

    /// The training samples held
    #[must_use]
    pub fn training_data(&self) -> &[TrainingSample] {
        &self.training_data
    }

    /// The current ensemble (empty until trained)
    #[must_use]
    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    /// Predictor configuration
    #[must_use]
    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }
}

/// Convert integer predictions into the form
/// [`SchedulerEngine::ai_scheduling`](jobsim_core::SchedulerEngine::ai_scheduling) takes
#[must_use]
pub fn as_engine_predictions(predictions: &[u64]) -> Vec<f64> {
    predictions.iter().map(|&p| p as f64).collect()
}

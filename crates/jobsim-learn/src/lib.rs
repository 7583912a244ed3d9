//! Learning components for jobsim
//!
//! This crate provides:
//! - A bootstrap-aggregated ensemble of randomised decision trees that
//!   predicts process burst times for the AI-hybrid policy
//! - An epsilon-greedy Q-learning advisor that maps processes to priority
//!   tiers and learns from finished schedules

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod action;
pub mod advisor;
pub mod forest;
pub mod predictor;
pub mod reward;
pub mod synthetic;
pub mod value;

// Re-export learners
pub use advisor::{AdvisorConfig, ReinforcementAdvisor};
pub use predictor::{as_engine_predictions, BurstTimePredictor, ModelEvaluation, PredictorConfig};

// Re-export building blocks
pub use action::PriorityTier;
pub use forest::{DecisionTree, Ensemble, Features, TrainingSample, TreeParams, NUM_FEATURES};
pub use reward::{LatencyReward, Reward, RewardFunction};
pub use synthetic::SyntheticGenerator;
pub use value::{QTable, StateKey};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AdvisorConfig, BurstTimePredictor, ModelEvaluation, PredictorConfig, PriorityTier,
        ReinforcementAdvisor,
    };
    pub use jobsim_core::prelude::*;
}

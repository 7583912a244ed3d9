//! Tabular action values over discretised process states

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use jobsim_core::ProcessRecord;

use crate::action::PriorityTier;

/// Discretised process state: exact priority, burst in buckets of 2,
/// memory in buckets of 20
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey {
    /// Process priority
    pub priority: u32,
    /// `burst_time / 2`
    pub burst_bucket: u64,
    /// `memory_required / 20`
    pub memory_bucket: u64,
}

impl StateKey {
    /// Discretise a process
    #[must_use]
    pub fn of(process: &ProcessRecord) -> Self {
        Self {
            priority: process.priority,
            burst_bucket: process.burst_time / 2,
            memory_bucket: process.memory_required / 20,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.priority, self.burst_bucket, self.memory_bucket)
    }
}

/// Action values per tier, in [`PriorityTier::ALL`] order
pub type ActionValues = IndexMap<PriorityTier, f64>;

/// Q-table mapping states to per-tier value estimates.
///
/// Rows are created on first touch with every tier at the default value and
/// are never removed.
#[derive(Debug, Clone, Default)]
pub struct QTable {
    q_values: HashMap<StateKey, ActionValues>,
    default_q_value: f64,
}

impl QTable {
    /// Create an empty table
    #[must_use]
    pub fn new(default_q_value: f64) -> Self {
        Self {
            q_values: HashMap::new(),
            default_q_value,
        }
    }

    /// Row for `state`, created if missing
    pub fn row_mut(&mut self, state: StateKey) -> &mut ActionValues {
        let default = self.default_q_value;
        self.q_values.entry(state).or_insert_with(|| {
            PriorityTier::ALL
                .iter()
                .map(|&tier| (tier, default))
                .collect()
        })
    }

    /// Row for `state`, if it has been seen
    #[must_use]
    pub fn row(&self, state: &StateKey) -> Option<&ActionValues> {
        self.q_values.get(state)
    }

    /// Value of one state-action pair, if the state has been seen
    #[must_use]
    pub fn get(&self, state: &StateKey, action: PriorityTier) -> Option<f64> {
        self.row(state).and_then(|row| row.get(&action).copied())
    }

    /// Overwrite one state-action value
    pub fn set(&mut self, state: StateKey, action: PriorityTier, value: f64) {
        self.row_mut(state).insert(action, value);
    }

    /// Largest value in a seen state's row
    #[must_use]
    pub fn max_value(&self, state: &StateKey) -> Option<f64> {
        self.row(state)
            .and_then(|row| row.values().copied().reduce(f64::max))
    }

    /// Number of states seen
    #[must_use]
    pub fn len(&self) -> usize {
        self.q_values.len()
    }

    /// Whether no state has been seen
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.q_values.is_empty()
    }
}

/// Best tier in a row: the maximum value, or [`PriorityTier::Medium`]
/// when more than one tier shares it
#[must_use]
pub fn best_action(row: &ActionValues) -> PriorityTier {
    let Some(max) = row.values().copied().reduce(f64::max) else {
        return PriorityTier::Medium;
    };
    let mut tied = row.iter().filter(|(_, &v)| v == max).map(|(&tier, _)| tier);

    match (tied.next(), tied.next()) {
        (Some(tier), None) => tier,
        _ => PriorityTier::Medium,
    }
}

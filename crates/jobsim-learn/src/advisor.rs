//! Epsilon-greedy Q-learning advisor that maps processes to priority tiers

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use jobsim_core::{ProcessRecord, SchedulingResult};

use crate::action::PriorityTier;
use crate::reward::{LatencyReward, Reward, RewardFunction};
use crate::value::{best_action, QTable, StateKey};

/// Advisor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Step size α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount_factor: f64,
    /// Exploration probability ε
    pub epsilon: f64,
    /// Reward shaping
    pub reward: LatencyReward,
    /// Random seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            epsilon: 0.1,
            reward: LatencyReward::default(),
            seed: None,
        }
    }
}

/// Learns which priority tier serves each kind of process best.
///
/// The advisor is not consulted by any scheduling policy; it accumulates
/// feedback from finished schedules.
#[derive(Debug, Clone)]
pub struct ReinforcementAdvisor<R = StdRng> {
    config: AdvisorConfig,
    q_table: QTable,
    rng: R,
}

impl ReinforcementAdvisor<StdRng> {
    /// Create an advisor with the default configuration and an OS seed
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AdvisorConfig::default())
    }

    /// Create an advisor from a configuration, honouring its seed
    #[must_use]
    pub fn with_config(config: AdvisorConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self::with_rng(config, rng)
    }
}

impl Default for ReinforcementAdvisor<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ReinforcementAdvisor<R> {
    /// Create an advisor drawing exploration randomness from `rng`
    pub fn with_rng(config: AdvisorConfig, rng: R) -> Self {
        Self {
            config,
            q_table: QTable::new(0.0),
            rng,
        }
    }

    /// Epsilon-greedy tier choice.
    ///
    /// Explores uniformly with probability ε; otherwise returns the best known
    /// tier for the process's state, creating the state's row if needed.
    pub fn select_action(&mut self, process: &ProcessRecord) -> PriorityTier {
        if self.rng.gen::<f64>() < self.config.epsilon {
            return PriorityTier::sample(&mut self.rng);
        }
        best_action(self.q_table.row_mut(StateKey::of(process)))
    }

    /// Best known tier for a process without exploring or growing the table;
    /// unseen states get [`PriorityTier::Medium`]
    #[must_use]
    pub fn recommend(&self, process: &ProcessRecord) -> PriorityTier {
        self.q_table
            .row(&StateKey::of(process))
            .map_or(PriorityTier::Medium, best_action)
    }

    /// One-step Q-learning update:
    /// `Q ← Q + α·(reward + γ·maxQ(next) − Q)`.
    ///
    /// `maxQ(next)` is 0 when there is no next process or its state is unseen.
    pub fn update_q_value(
        &mut self,
        process: &ProcessRecord,
        action: PriorityTier,
        reward: f64,
        next_process: Option<&ProcessRecord>,
    ) {
        let max_next = next_process
            .and_then(|next| self.q_table.max_value(&StateKey::of(next)))
            .unwrap_or(0.0);

        let state = StateKey::of(process);
        let alpha = self.config.learning_rate;
        let gamma = self.config.discount_factor;
        let q = self.q_table.row_mut(state).get(&action).copied().unwrap_or_default();
        let updated = q + alpha * (reward + gamma * max_next - q);
        self.q_table.set(state, action, updated);

        debug!(%state, %action, reward, q = updated, "q-value updated");
    }

    /// `100 − 2·waiting − 0.5·turnaround` under the default reward shaping
    #[must_use]
    pub fn calculate_reward(&self, waiting_time: f64, turnaround_time: f64) -> f64 {
        self.config.reward.reward(waiting_time, turnaround_time).value()
    }

    /// Feed every process of a finished schedule back into the table, in
    /// dispatch order. Each process is rewarded for its own waiting and
    /// turnaround times; the next dispatched process supplies the bootstrap
    /// state. Returns the total reward.
    pub fn learn_from_result(&mut self, result: &SchedulingResult) -> Reward {
        let ordered: Vec<&ProcessRecord> = result
            .dispatch_order()
            .into_iter()
            .filter_map(|id| result.process(id))
            .collect();

        let mut total = Reward::default();
        for (i, process) in ordered.iter().enumerate() {
            let action = self.select_action(process);
            let reward = self.config.reward.reward_for(process);
            self.update_q_value(process, action, reward.value(), ordered.get(i + 1).copied());
            total = total + reward;
        }
        total
    }

    /// Current value of a state-action pair, if the state has been seen
    #[must_use]
    pub fn q_value(&self, process: &ProcessRecord, action: PriorityTier) -> Option<f64> {
        self.q_table.get(&StateKey::of(process), action)
    }

    /// Number of distinct states seen
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.q_table.len()
    }

    /// The underlying table
    #[must_use]
    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Advisor configuration
    #[must_use]
    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use jobsim_core::SchedulerEngine;

    fn greedy(seed: u64) -> ReinforcementAdvisor {
        ReinforcementAdvisor::with_config(AdvisorConfig {
            epsilon: 0.0,
            seed: Some(seed),
            ..AdvisorConfig::default()
        })
    }

    #[test]
    fn test_unseen_state_defaults_to_medium() {
        let mut advisor = greedy(1);
        let p = ProcessRecord::new(1, 0, 4, 2).with_memory(30);
        assert_eq!(advisor.select_action(&p), PriorityTier::Medium);
        assert_eq!(advisor.state_count(), 1);
        assert_eq!(advisor.q_value(&p, PriorityTier::High), Some(0.0));
    }

    #[test]
    fn test_update_without_next() {
        let mut advisor = greedy(2);
        let p = ProcessRecord::new(1, 0, 4, 2);
        advisor.update_q_value(&p, PriorityTier::High, 50.0, None);
        assert_relative_eq!(advisor.q_value(&p, PriorityTier::High).unwrap(), 5.0);

        advisor.update_q_value(&p, PriorityTier::High, 50.0, None);
        assert_relative_eq!(advisor.q_value(&p, PriorityTier::High).unwrap(), 9.5);
        assert_eq!(advisor.select_action(&p), PriorityTier::High);
    }

    #[test]
    fn test_update_bootstraps_from_seen_next_state() {
        let mut advisor = greedy(3);
        let p = ProcessRecord::new(1, 0, 4, 2);
        let next = ProcessRecord::new(2, 0, 10, 7).with_memory(80);

        // unseen next state contributes nothing
        advisor.update_q_value(&p, PriorityTier::Low, 10.0, Some(&next));
        assert_relative_eq!(advisor.q_value(&p, PriorityTier::Low).unwrap(), 1.0);

        advisor.update_q_value(&next, PriorityTier::Medium, 20.0, None);
        assert_relative_eq!(advisor.q_value(&next, PriorityTier::Medium).unwrap(), 2.0);

        // 1 + 0.1 * (10 + 0.9 * 2 - 1)
        advisor.update_q_value(&p, PriorityTier::Low, 10.0, Some(&next));
        assert_relative_eq!(advisor.q_value(&p, PriorityTier::Low).unwrap(), 2.08);
    }

    #[test]
    fn test_recommend_is_read_only() {
        let mut advisor = greedy(7);
        let p = ProcessRecord::new(1, 0, 4, 2);
        assert_eq!(advisor.recommend(&p), PriorityTier::Medium);
        assert_eq!(advisor.state_count(), 0);

        advisor.update_q_value(&p, PriorityTier::Low, 30.0, None);
        assert_eq!(advisor.recommend(&p), PriorityTier::Low);
    }

    #[test]
    fn test_calculate_reward() {
        let advisor = greedy(4);
        assert_relative_eq!(advisor.calculate_reward(3.0, 8.0), 90.0);
    }

    #[test]
    fn test_full_exploration_still_returns_a_tier() {
        let mut advisor = ReinforcementAdvisor::with_config(AdvisorConfig {
            epsilon: 1.0,
            seed: Some(5),
            ..AdvisorConfig::default()
        });
        let p = ProcessRecord::new(1, 0, 4, 2);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            seen.insert(advisor.select_action(&p));
        }
        assert_eq!(seen.len(), 3);
        // exploring never touches the table
        assert_eq!(advisor.state_count(), 0);
    }

    #[test]
    fn test_learn_from_result() {
        let procs = vec![
            ProcessRecord::new(1, 0, 5, 1),
            ProcessRecord::new(2, 1, 3, 4).with_memory(40),
            ProcessRecord::new(3, 2, 8, 2).with_memory(90),
        ];
        let result = SchedulerEngine::new(&procs).fcfs().unwrap();
        let mut advisor = greedy(6);
        let total = advisor.learn_from_result(&result);

        // waits 0, 4, 6; turnarounds 5, 7, 14
        assert_relative_eq!(total.value(), 97.5 + 88.5 + 81.0);
        assert_eq!(advisor.state_count(), 3);
    }
}

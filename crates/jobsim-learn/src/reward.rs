//! Reward signals for scheduling feedback

use serde::{Deserialize, Serialize};

use jobsim_core::ProcessRecord;

/// Scalar reward
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Reward(pub f64);

impl Reward {
    /// Create a new reward
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the reward value
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl std::ops::Add for Reward {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}

impl std::iter::Sum for Reward {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, r| acc + r)
    }
}

/// Scores how well a finished process was served
pub trait RewardFunction: Send + Sync {
    /// Reward for the given waiting and turnaround times
    fn reward(&self, waiting_time: f64, turnaround_time: f64) -> Reward;

    /// Reward for a process whose timings have been derived
    fn reward_for(&self, process: &ProcessRecord) -> Reward {
        self.reward(process.waiting_time as f64, process.turnaround_time as f64)
    }
}

/// Linear penalty on latency: `base - w·waiting - t·turnaround`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyReward {
    /// Reward for a process served instantly
    pub base: f64,
    /// Penalty per unit of waiting time
    pub waiting_weight: f64,
    /// Penalty per unit of turnaround time
    pub turnaround_weight: f64,
}

impl Default for LatencyReward {
    fn default() -> Self {
        Self {
            base: 100.0,
            waiting_weight: 2.0,
            turnaround_weight: 0.5,
        }
    }
}

impl RewardFunction for LatencyReward {
    fn reward(&self, waiting_time: f64, turnaround_time: f64) -> Reward {
        Reward(
            self.base - self.waiting_weight * waiting_time
                - self.turnaround_weight * turnaround_time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_latency_reward() {
        let r = LatencyReward::default();
        assert_relative_eq!(r.reward(0.0, 0.0).value(), 100.0);
        assert_relative_eq!(r.reward(4.0, 10.0).value(), 87.0);
        assert_relative_eq!(r.reward(60.0, 10.0).value(), -25.0);
    }

    #[test]
    fn test_reward_for_process() {
        let mut p = ProcessRecord::new(1, 1, 3, 1);
        p.waiting_time = 2;
        p.turnaround_time = 5;
        assert_relative_eq!(LatencyReward::default().reward_for(&p).value(), 93.5);
    }

    #[test]
    fn test_rewards_sum() {
        let total: Reward = [1.5, 2.0, -0.5].into_iter().map(Reward::new).sum();
        assert_relative_eq!(total.value(), 3.0);
    }
}

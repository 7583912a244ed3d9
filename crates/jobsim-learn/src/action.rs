//! Priority tiers the advisor can recommend

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use jobsim_core::SchedError;

/// Recommended priority tier for a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    /// Dispatch ahead of the rest
    High,
    /// No adjustment
    Medium,
    /// Dispatch after the rest
    Low,
}

impl PriorityTier {
    /// Every tier, in table order
    pub const ALL: [PriorityTier; 3] = [Self::High, Self::Medium, Self::Low];

    /// Pick a tier uniformly at random
    pub fn sample<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityTier {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(SchedError::InvalidInput(format!(
                "unknown priority tier: {other}"
            ))),
        }
    }
}

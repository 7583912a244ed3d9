//! Randomised decision trees and their bootstrap-aggregated ensemble

use rand::Rng;
use serde::{Deserialize, Serialize};

use jobsim_core::{Result, SchedError};

/// Number of features per sample: arrival, priority, memory, I/O operations
pub const NUM_FEATURES: usize = 4;

/// Feature vector of one process
pub type Features = [f64; NUM_FEATURES];

/// A labelled training example
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    /// `[arrival, priority, memory, io_ops]`
    pub features: Features,
    /// Observed burst time
    pub label: f64,
}

impl TrainingSample {
    /// Create a sample
    #[must_use]
    pub fn new(features: Features, label: f64) -> Self {
        Self { features, label }
    }
}

/// Stopping rules for tree growth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Nodes at this depth become leaves
    pub max_depth: usize,
    /// Nodes with fewer samples become leaves
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 5,
            min_samples_split: 3,
        }
    }
}

/// Binary regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DecisionTree {
    /// Terminal node holding the mean label of its partition
    Leaf {
        /// Predicted value
        value: f64,
    },
    /// Internal node: `feature <= threshold` goes left, everything else right
    Split {
        /// Feature tested at this node
        feature_index: usize,
        /// Split point
        threshold: f64,
        /// Subtree for `feature <= threshold`
        left: Box<DecisionTree>,
        /// Subtree for `feature > threshold`
        right: Box<DecisionTree>,
    },
}

impl DecisionTree {
    /// Grow a tree on `samples`.
    ///
    /// Each internal node splits on a uniformly chosen feature at the value
    /// held by the node's middle sample (by position, not sorted).
    pub fn fit<R>(samples: &[TrainingSample], params: &TreeParams, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        let refs: Vec<&TrainingSample> = samples.iter().collect();
        Self::fit_refs(&refs, params, rng)
    }

    pub(crate) fn fit_refs<R>(
        samples: &[&TrainingSample],
        params: &TreeParams,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        if samples.is_empty() {
            return Err(SchedError::Training(
                "cannot grow a tree from zero samples".to_string(),
            ));
        }
        Ok(Self::grow(samples, 0, params, rng))
    }

    fn grow<R>(samples: &[&TrainingSample], depth: usize, params: &TreeParams, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        if depth >= params.max_depth || samples.len() < params.min_samples_split {
            return Self::leaf(samples);
        }

        let feature_index = rng.gen_range(0..NUM_FEATURES);
        let threshold = samples[samples.len() / 2].features[feature_index];

        let (left, right): (Vec<&TrainingSample>, Vec<&TrainingSample>) = samples
            .iter()
            .copied()
            .partition(|s| s.features[feature_index] <= threshold);

        if left.is_empty() || right.is_empty() {
            return Self::leaf(samples);
        }

        Self::Split {
            feature_index,
            threshold,
            left: Box::new(Self::grow(&left, depth + 1, params, rng)),
            right: Box::new(Self::grow(&right, depth + 1, params, rng)),
        }
    }

    fn leaf(samples: &[&TrainingSample]) -> Self {
        let total: f64 = samples.iter().map(|s| s.label).sum();
        Self::Leaf {
            value: total / samples.len() as f64,
        }
    }

    /// Descend to a leaf and return its value
    #[must_use]
    pub fn predict(&self, features: &Features) -> f64 {
        let mut node = self;
        loop {
            match node {
                Self::Leaf { value } => return *value,
                Self::Split {
                    feature_index,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature_index] <= *threshold {
                        left.as_ref()
                    } else {
                        right.as_ref()
                    };
                }
            }
        }
    }

    /// Length of the longest root-to-leaf path, in edges
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Number of leaves
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Split { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

/// Fixed-size collection of trees, each grown on its own bootstrap resample
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ensemble {
    trees: Vec<DecisionTree>,
}

impl Ensemble {
    /// Train `num_trees` trees, each on a bootstrap resample the size of `samples`
    pub fn train<R>(
        samples: &[TrainingSample],
        num_trees: usize,
        params: &TreeParams,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        if num_trees == 0 {
            return Err(SchedError::Training(
                "ensemble needs at least one tree".to_string(),
            ));
        }
        if samples.is_empty() {
            return Err(SchedError::Training("training set is empty".to_string()));
        }

        let n = samples.len();
        let mut trees = Vec::with_capacity(num_trees);
        for _ in 0..num_trees {
            let bootstrap: Vec<&TrainingSample> =
                (0..n).map(|_| &samples[rng.gen_range(0..n)]).collect();
            trees.push(DecisionTree::fit_refs(&bootstrap, params, rng)?);
        }
        Ok(Self { trees })
    }

    /// Mean of the per-tree predictions, `None` for an empty ensemble
    #[must_use]
    pub fn predict_raw(&self, features: &Features) -> Option<f64> {
        if self.trees.is_empty() {
            return None;
        }
        let total: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        Some(total / self.trees.len() as f64)
    }

    /// Mean prediction rounded to the nearest integer, never below 1
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn predict(&self, features: &Features) -> Option<u64> {
        self.predict_raw(features)
            .map(|mean| mean.round().max(1.0) as u64)
    }

    /// The trained trees
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Number of trees
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Whether the ensemble holds no trees
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn linear_samples() -> Vec<TrainingSample> {
        (0..40)
            .map(|i| {
                let x = f64::from(i);
                TrainingSample::new([x, 1.0, 10.0, 0.0], if i < 20 { 2.0 } else { 12.0 })
            })
            .collect()
    }

    #[test]
    fn test_leaf_when_too_few_samples() {
        let samples = vec![
            TrainingSample::new([0.0; 4], 3.0),
            TrainingSample::new([1.0; 4], 5.0),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(&samples, &TreeParams::default(), &mut rng).unwrap();
        assert_eq!(tree, DecisionTree::Leaf { value: 4.0 });
    }

    #[test]
    fn test_leaf_when_split_cannot_separate() {
        let samples = vec![TrainingSample::new([2.0, 2.0, 2.0, 2.0], 7.0); 10];
        let mut rng = StdRng::seed_from_u64(2);
        let tree = DecisionTree::fit(&samples, &TreeParams::default(), &mut rng).unwrap();
        assert_eq!(tree, DecisionTree::Leaf { value: 7.0 });
    }

    #[test]
    fn test_depth_is_bounded() {
        let samples: Vec<_> = (0..200)
            .map(|i| {
                let x = f64::from(i);
                TrainingSample::new([x, x * 2.0, 200.0 - x, f64::from(i % 7)], x)
            })
            .collect();
        let params = TreeParams {
            max_depth: 3,
            min_samples_split: 2,
        };
        let mut rng = StdRng::seed_from_u64(3);
        let tree = DecisionTree::fit(&samples, &params, &mut rng).unwrap();
        assert!(tree.depth() <= 3);
        assert!(tree.leaf_count() <= 8);
    }

    #[test]
    fn test_split_routes_by_threshold() {
        let tree = DecisionTree::Split {
            feature_index: 1,
            threshold: 5.0,
            left: Box::new(DecisionTree::Leaf { value: 1.0 }),
            right: Box::new(DecisionTree::Leaf { value: 9.0 }),
        };
        assert_relative_eq!(tree.predict(&[0.0, 5.0, 0.0, 0.0]), 1.0);
        assert_relative_eq!(tree.predict(&[0.0, 5.5, 0.0, 0.0]), 9.0);
    }

    #[test]
    fn test_empty_samples_fail() {
        let mut rng = StdRng::seed_from_u64(4);
        assert!(DecisionTree::fit(&[], &TreeParams::default(), &mut rng).is_err());
        assert!(Ensemble::train(&[], 10, &TreeParams::default(), &mut rng).is_err());
        assert!(Ensemble::train(&linear_samples(), 0, &TreeParams::default(), &mut rng).is_err());
    }

    #[test]
    fn test_ensemble_prediction_stays_within_label_range() {
        let samples = linear_samples();
        let mut rng = StdRng::seed_from_u64(5);
        let ensemble = Ensemble::train(&samples, 10, &TreeParams::default(), &mut rng).unwrap();

        assert_eq!(ensemble.len(), 10);
        for x in [0.0, 10.0, 25.0, 39.0] {
            let raw = ensemble.predict_raw(&[x, 1.0, 10.0, 0.0]).unwrap();
            assert!((2.0..=12.0).contains(&raw));
        }
    }

    #[test]
    fn test_ensemble_floors_at_one() {
        let samples = vec![TrainingSample::new([1.0; 4], 0.2); 5];
        let mut rng = StdRng::seed_from_u64(6);
        let ensemble = Ensemble::train(&samples, 3, &TreeParams::default(), &mut rng).unwrap();
        assert_eq!(ensemble.predict(&[1.0; 4]), Some(1));
    }

    #[test]
    fn test_empty_ensemble_predicts_nothing() {
        assert_eq!(Ensemble::default().predict(&[0.0; 4]), None);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let samples = linear_samples();
        let a = Ensemble::train(&samples, 5, &TreeParams::default(), &mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = Ensemble::train(&samples, 5, &TreeParams::default(), &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(a, b);
    }
}

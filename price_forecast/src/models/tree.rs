//! Regression tree (CART with squared-error splits)
//!
//! Shared building block for both ensemble members. A tree is grown on a
//! subset of row indices so that bagging and subsampling never copy the
//! feature matrix.

use crate::error::{ForecastError, Result};
use crate::models::validate_training_data;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth of the tree (root is depth 0)
    pub max_depth: usize,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples in each leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

impl TreeParams {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if self.max_features == Some(0) {
            return Err(ForecastError::InvalidParameter(
                "max_features must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Terminal node predicting the mean target of its samples
    Leaf { value: f64, n_samples: usize },
    /// Internal node; samples with `feature <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        n_samples: usize,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

/// Fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
    n_features: usize,
}

/// Candidate split found during the sweep
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Grow a tree on the rows of `features` selected by `indices`
    ///
    /// `indices` may contain repeats (bootstrap samples). `rng` decides the
    /// order in which candidate features are examined.
    pub fn fit(
        params: &TreeParams,
        features: &[Vec<f64>],
        targets: &[f64],
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Result<Self> {
        params.validate()?;
        if indices.is_empty() {
            return Err(ForecastError::ModelError(
                "Cannot grow a tree on zero samples".to_string(),
            ));
        }
        let n_features = validate_training_data(features, targets)?;
        if indices.iter().any(|&i| i >= features.len() || i >= targets.len()) {
            return Err(ForecastError::ModelError(
                "Sample index out of range".to_string(),
            ));
        }

        let grower = Grower {
            params,
            features,
            targets,
            n_features,
        };
        let root = grower.grow(indices.to_vec(), 0, rng);

        Ok(Self { root, n_features })
    }

    /// Predict the target for one feature row
    pub fn predict_one(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let goes_left = row.get(*feature).map_or(false, |v| *v <= *threshold);
                    node = if goes_left { left } else { right };
                }
            }
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

struct Grower<'a> {
    params: &'a TreeParams,
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    n_features: usize,
}

impl Grower<'_> {
    fn grow(&self, indices: Vec<usize>, depth: usize, rng: &mut ChaCha8Rng) -> TreeNode {
        let n = indices.len();
        let mean = indices.iter().map(|&i| self.targets[i]).sum::<f64>() / n as f64;
        let sse: f64 = indices
            .iter()
            .map(|&i| (self.targets[i] - mean).powi(2))
            .sum();

        if depth >= self.params.max_depth
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf
            || sse <= 1e-12
        {
            return TreeNode::Leaf {
                value: mean,
                n_samples: n,
            };
        }

        let split = match self.best_split(&indices, mean, sse, rng) {
            Some(split) => split,
            None => {
                return TreeNode::Leaf {
                    value: mean,
                    n_samples: n,
                }
            }
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.features[i][split.feature] <= split.threshold);

        let left = self.grow(left_idx, depth + 1, rng);
        let right = self.grow(right_idx, depth + 1, rng);

        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            n_samples: n,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Sweep each candidate feature in sorted order, tracking running sums of
    /// the centred targets so every threshold is scored in O(1).
    fn best_split(
        &self,
        indices: &[usize],
        mean: f64,
        sse: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf;

        let mut candidates: Vec<usize> = (0..self.n_features).collect();
        candidates.shuffle(rng);
        candidates.truncate(self.params.max_features.unwrap_or(self.n_features));

        let total_sum: f64 = indices.iter().map(|&i| self.targets[i] - mean).sum();
        let total_sq: f64 = sse;

        let mut best: Option<SplitCandidate> = None;
        let mut order = indices.to_vec();

        for feature in candidates {
            order.sort_by(|&a, &b| self.features[a][feature].total_cmp(&self.features[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for k in 0..n - 1 {
                let i = order[k];
                let centred = self.targets[i] - mean;
                left_sum += centred;
                left_sq += centred * centred;

                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf {
                    continue;
                }
                if n_right < min_leaf {
                    break;
                }

                let current = self.features[i][feature];
                let next = self.features[order[k + 1]][feature];
                if next <= current {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let child_sse = (left_sq - left_sum * left_sum / n_left as f64)
                    + (right_sq - right_sum * right_sum / n_right as f64);
                let gain = sse - child_sse;

                if gain > best.as_ref().map_or(1e-12, |b| b.gain) {
                    let mut threshold = current + (next - current) / 2.0;
                    if threshold >= next {
                        threshold = current;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let features: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let targets: Vec<f64> = (0..40).map(|i| if i < 20 { 10.0 } else { 30.0 }).collect();
        (features, targets)
    }

    #[test]
    fn test_tree_learns_step() {
        let (features, targets) = step_data();
        let indices: Vec<usize> = (0..features.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let tree =
            RegressionTree::fit(&TreeParams::default(), &features, &targets, &indices, &mut rng)
                .unwrap();

        assert_eq!(tree.predict_one(&[5.0, 0.0]), 10.0);
        assert_eq!(tree.predict_one(&[35.0, 1.0]), 30.0);
        // One split separates the two levels exactly
        assert_eq!(tree.root().n_leaves(), 2);
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let features = vec![vec![1.0, 2.0], vec![3.0], vec![5.0, 6.0]];
        let targets = [1.0, 2.0, 3.0];
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let err = RegressionTree::fit(
            &TreeParams::default(),
            &features,
            &targets,
            &[0, 1, 2],
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, ForecastError::ValidationError(_)));
    }

    #[test]
    fn test_constant_targets_give_single_leaf() {
        let features: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let targets = vec![50.0; 10];
        let indices: Vec<usize> = (0..10).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let tree =
            RegressionTree::fit(&TreeParams::default(), &features, &targets, &indices, &mut rng)
                .unwrap();

        assert!(tree.root().is_leaf());
        assert_eq!(tree.predict_one(&[100.0]), 50.0);
    }

    #[test]
    fn test_depth_limit_respected() {
        let features: Vec<Vec<f64>> = (0..64).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..64).map(|i| (i * i) as f64).collect();
        let indices: Vec<usize> = (0..64).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let params = TreeParams {
            max_depth: 3,
            ..Default::default()
        };

        let tree = RegressionTree::fit(&params, &features, &targets, &indices, &mut rng).unwrap();

        // depth() counts levels, so max_depth splits give max_depth + 1 levels
        assert!(tree.depth() <= 4);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let (features, targets) = step_data();
        let indices: Vec<usize> = (0..features.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let params = TreeParams {
            min_samples_leaf: 15,
            ..Default::default()
        };

        let tree = RegressionTree::fit(&params, &features, &targets, &indices, &mut rng).unwrap();

        fn check(node: &TreeNode) {
            match node {
                TreeNode::Leaf { n_samples, .. } => assert!(*n_samples >= 15),
                TreeNode::Split { left, right, .. } => {
                    check(left);
                    check(right);
                }
            }
        }
        check(tree.root());
    }

    #[test]
    fn test_rejects_empty_sample() {
        let (features, targets) = step_data();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(
            RegressionTree::fit(&TreeParams::default(), &features, &targets, &[], &mut rng)
                .is_err()
        );
    }
}

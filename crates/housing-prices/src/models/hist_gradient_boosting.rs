//! Histogram-based gradient boosted regression trees.
//!
//! Least-squares boosting over pre-binned features. Each feature is
//! discretised once into at most [`MAX_BINS`] bins; trees are grown
//! best-first (largest gain split next) on per-bin gradient histograms.
//!
//! Split thresholds are kept in raw feature units, so prediction works on
//! unbinned input: `x <= threshold` goes left.
//!
//! With early stopping active, a seeded fraction of the training rows is
//! held out and scored after every iteration; boosting ends once
//! `n_iter_no_change` consecutive iterations fail to improve the held-out
//! loss by more than `tol`.

use super::{Regressor, check_prediction_width, check_training_data};
use crate::data::shuffled_partition;
use crate::error::{HousingError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use tracing::debug;

/// Upper bound on the number of bins per feature.
pub const MAX_BINS: usize = 255;

/// [`EarlyStopping::Auto`] turns on above this many training rows.
pub const AUTO_EARLY_STOPPING_ROWS: usize = 10_000;

/// Whether boosting holds out a validation set and stops early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EarlyStopping {
    /// Active when the training set has more than
    /// [`AUTO_EARLY_STOPPING_ROWS`] rows.
    #[default]
    Auto,
    Enabled,
    Disabled,
}

impl EarlyStopping {
    pub fn is_active(self, n_samples: usize) -> bool {
        match self {
            Self::Auto => n_samples > AUTO_EARLY_STOPPING_ROWS,
            Self::Enabled => true,
            Self::Disabled => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistGradientBoostingRegressor {
    pub learning_rate: f64,
    /// Number of boosting iterations (one tree each).
    pub max_iter: usize,
    pub max_depth: usize,
    pub max_leaf_nodes: usize,
    pub min_samples_leaf: usize,
    pub l2_regularization: f64,
    pub early_stopping: EarlyStopping,
    /// Share of training rows held out for early stopping.
    pub validation_fraction: f64,
    pub n_iter_no_change: usize,
    /// Minimum held-out improvement that counts.
    pub tol: f64,
    /// Seeds the validation split.
    pub random_state: u64,
    fitted: Option<FittedEnsemble>,
}

#[derive(Debug, Clone)]
struct FittedEnsemble {
    baseline: f64,
    n_features: usize,
    trees: Vec<Tree>,
}

#[derive(Debug, Clone)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Flat tree; node 0 is the root.
#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Training matrix discretised per feature.
struct BinnedData {
    /// Column-major bin indices: `bins[feature][sample]`.
    bins: Vec<Vec<u8>>,
    /// Ascending split thresholds per feature; bin `b` holds values
    /// in `(thresholds[b - 1], thresholds[b]]`.
    thresholds: Vec<Vec<f64>>,
}

impl BinnedData {
    fn new(x: &Array2<f64>) -> Self {
        let mut bins = Vec::with_capacity(x.ncols());
        let mut thresholds = Vec::with_capacity(x.ncols());

        for column in x.columns() {
            let cuts = bin_thresholds(column, MAX_BINS);
            let binned = column
                .iter()
                .map(|v| cuts.partition_point(|t| *t < *v) as u8)
                .collect();
            bins.push(binned);
            thresholds.push(cuts);
        }

        Self { bins, thresholds }
    }

    fn n_bins(&self, feature: usize) -> usize {
        self.thresholds[feature].len() + 1
    }
}

/// Held-out rows, scored once at the baseline and after every tree.
struct Validation<'a> {
    x: &'a Array2<f64>,
    y: &'a Array1<f64>,
    raw: Vec<f64>,
    scores: Vec<f64>,
}

impl<'a> Validation<'a> {
    fn new(x: &'a Array2<f64>, y: &'a Array1<f64>, baseline: f64) -> Self {
        let mut validation = Self {
            x,
            y,
            raw: vec![baseline; x.nrows()],
            scores: Vec::new(),
        };
        validation.record_score();
        validation
    }

    fn add_tree(&mut self, tree: &Tree) {
        for (raw, row) in self.raw.iter_mut().zip(self.x.rows()) {
            *raw += tree.predict_row(row);
        }
        self.record_score();
    }

    /// Negative half squared error: higher is better.
    fn record_score(&mut self) {
        let loss = self
            .raw
            .iter()
            .zip(self.y.iter())
            .map(|(p, t)| 0.5 * (p - t).powi(2))
            .sum::<f64>()
            / self.raw.len() as f64;
        self.scores.push(-loss);
    }

    fn last_loss(&self) -> f64 {
        self.scores.last().map_or(f64::NAN, |s| -s)
    }
}

/// True when none of the last `n_iter_no_change` scores beats the score
/// just before them by more than `tol`.
fn should_stop(scores: &[f64], n_iter_no_change: usize, tol: f64) -> bool {
    if n_iter_no_change == 0 || scores.len() <= n_iter_no_change {
        return false;
    }
    let recent = scores.len() - n_iter_no_change;
    let reference = scores[recent - 1] + tol;
    scores[recent..].iter().all(|score| *score <= reference)
}

/// Split thresholds for one feature.
///
/// Midpoints between consecutive distinct values when there are at most
/// `max_bins` of them, otherwise midpoint-interpolated quantiles.
fn bin_thresholds(column: ArrayView1<'_, f64>, max_bins: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = column.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut distinct = sorted.clone();
    distinct.dedup();

    if distinct.len() <= max_bins {
        return distinct.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    }

    let last = (sorted.len() - 1) as f64;
    let mut cuts: Vec<f64> = (1..max_bins)
        .map(|k| {
            let position = k as f64 / max_bins as f64 * last;
            let lower = sorted[position.floor() as usize];
            let upper = sorted[position.ceil() as usize];
            (lower + upper) / 2.0
        })
        .collect();
    cuts.dedup();
    cuts
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    gain: f64,
    feature: usize,
    bin: usize,
}

/// A leaf under construction, with its best split if it can be split.
struct GrowingLeaf {
    node: usize,
    depth: usize,
    samples: Vec<usize>,
    sum_gradients: f64,
    split: Option<SplitCandidate>,
}

/// Parameters shared by every tree of one fit.
struct GrowthParams {
    max_depth: usize,
    max_leaf_nodes: usize,
    min_samples_leaf: usize,
    l2: f64,
}

impl GrowthParams {
    // Hessians are all 1 for least squares, so the hessian sum is a count.
    fn score(&self, sum_gradients: f64, count: usize) -> f64 {
        sum_gradients * sum_gradients / (count as f64 + self.l2)
    }

    fn leaf_value(&self, sum_gradients: f64, count: usize) -> f64 {
        -sum_gradients / (count as f64 + self.l2)
    }

    fn find_split(
        &self,
        data: &BinnedData,
        gradients: &[f64],
        samples: &[usize],
        sum_gradients: f64,
        depth: usize,
    ) -> Option<SplitCandidate> {
        if depth >= self.max_depth || samples.len() < 2 * self.min_samples_leaf {
            return None;
        }

        let total = samples.len();
        let parent_score = self.score(sum_gradients, total);
        let mut best: Option<SplitCandidate> = None;

        for (feature, feature_bins) in data.bins.iter().enumerate() {
            let n_bins = data.n_bins(feature);
            if n_bins < 2 {
                continue;
            }

            let mut hist_gradients = vec![0.0; n_bins];
            let mut hist_counts = vec![0usize; n_bins];
            for &i in samples {
                let bin = feature_bins[i] as usize;
                hist_gradients[bin] += gradients[i];
                hist_counts[bin] += 1;
            }

            let mut left_gradients = 0.0;
            let mut left_count = 0;
            for bin in 0..n_bins - 1 {
                left_gradients += hist_gradients[bin];
                left_count += hist_counts[bin];
                let right_count = total - left_count;

                if left_count < self.min_samples_leaf {
                    continue;
                }
                if right_count < self.min_samples_leaf {
                    break;
                }

                let gain = self.score(left_gradients, left_count)
                    + self.score(sum_gradients - left_gradients, right_count)
                    - parent_score;
                if gain > 0.0 && best.is_none_or(|b| gain > b.gain) {
                    best = Some(SplitCandidate { gain, feature, bin });
                }
            }
        }

        best
    }

    /// Grow one tree on the current gradients. Returns the tree and, for
    /// every leaf, the samples it holds with its value.
    fn grow(
        &self,
        data: &BinnedData,
        gradients: &[f64],
        n_samples: usize,
    ) -> (Tree, Vec<(Vec<usize>, f64)>) {
        let all: Vec<usize> = (0..n_samples).collect();
        let root_sum: f64 = gradients.iter().sum();
        let root_split = self.find_split(data, gradients, &all, root_sum, 0);

        let mut nodes = vec![TreeNode::Leaf { value: 0.0 }];
        let mut growing = vec![GrowingLeaf {
            node: 0,
            depth: 0,
            samples: all,
            sum_gradients: root_sum,
            split: root_split,
        }];

        while growing.len() < self.max_leaf_nodes {
            // Leaf with the largest gain; earliest wins ties.
            let mut pick: Option<(usize, SplitCandidate)> = None;
            for (i, leaf) in growing.iter().enumerate() {
                let Some(split) = leaf.split else { continue };
                if pick.is_none_or(|(_, best)| split.gain > best.gain) {
                    pick = Some((i, split));
                }
            }
            let Some((position, split)) = pick else {
                break;
            };

            let leaf = growing.remove(position);

            let feature_bins = &data.bins[split.feature];
            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = leaf
                .samples
                .into_iter()
                .partition(|&i| feature_bins[i] as usize <= split.bin);
            let left_sum: f64 = left_samples.iter().map(|&i| gradients[i]).sum();
            let right_sum = leaf.sum_gradients - left_sum;

            let left_node = nodes.len();
            let right_node = left_node + 1;
            nodes.push(TreeNode::Leaf { value: 0.0 });
            nodes.push(TreeNode::Leaf { value: 0.0 });
            nodes[leaf.node] = TreeNode::Split {
                feature: split.feature,
                threshold: data.thresholds[split.feature][split.bin],
                left: left_node,
                right: right_node,
            };

            let depth = leaf.depth + 1;
            for (node, samples, sum) in [
                (left_node, left_samples, left_sum),
                (right_node, right_samples, right_sum),
            ] {
                let split = self.find_split(data, gradients, &samples, sum, depth);
                growing.push(GrowingLeaf {
                    node,
                    depth,
                    samples,
                    sum_gradients: sum,
                    split,
                });
            }
        }

        let mut assignments = Vec::with_capacity(growing.len());
        for leaf in growing {
            let value = self.leaf_value(leaf.sum_gradients, leaf.samples.len());
            nodes[leaf.node] = TreeNode::Leaf { value };
            assignments.push((leaf.samples, value));
        }

        (Tree { nodes }, assignments)
    }
}

impl HistGradientBoostingRegressor {
    pub const DEFAULT_MAX_LEAF_NODES: usize = 31;
    pub const DEFAULT_MIN_SAMPLES_LEAF: usize = 20;
    pub const DEFAULT_VALIDATION_FRACTION: f64 = 0.1;
    pub const DEFAULT_N_ITER_NO_CHANGE: usize = 10;
    pub const DEFAULT_TOL: f64 = 1e-7;

    pub fn new(learning_rate: f64, max_depth: usize, max_iter: usize) -> Self {
        Self {
            learning_rate,
            max_iter,
            max_depth,
            max_leaf_nodes: Self::DEFAULT_MAX_LEAF_NODES,
            min_samples_leaf: Self::DEFAULT_MIN_SAMPLES_LEAF,
            l2_regularization: 0.0,
            early_stopping: EarlyStopping::default(),
            validation_fraction: Self::DEFAULT_VALIDATION_FRACTION,
            n_iter_no_change: Self::DEFAULT_N_ITER_NO_CHANGE,
            tol: Self::DEFAULT_TOL,
            random_state: 0,
            fitted: None,
        }
    }

    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    pub fn with_early_stopping(mut self, early_stopping: EarlyStopping) -> Self {
        self.early_stopping = early_stopping;
        self
    }

    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    /// Number of fitted trees.
    pub fn n_trees(&self) -> usize {
        self.fitted.as_ref().map_or(0, |f| f.trees.len())
    }

    fn growth_params(&self) -> GrowthParams {
        GrowthParams {
            max_depth: self.max_depth,
            max_leaf_nodes: self.max_leaf_nodes.max(2),
            min_samples_leaf: self.min_samples_leaf.max(1),
            l2: self.l2_regularization,
        }
    }

    /// Run the boosting loop on `x`/`y`, scoring `validation` after every
    /// tree when it is given.
    fn boost(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        validation: Option<(&Array2<f64>, &Array1<f64>)>,
    ) -> FittedEnsemble {
        let n_samples = x.nrows();
        let data = BinnedData::new(x);
        let params = self.growth_params();

        let baseline = y.mean().unwrap_or(0.0);
        let mut raw = vec![baseline; n_samples];
        let mut gradients = vec![0.0; n_samples];
        let mut trees = Vec::with_capacity(self.max_iter);
        let mut validation =
            validation.map(|(x_val, y_val)| Validation::new(x_val, y_val, baseline));

        for iteration in 0..self.max_iter {
            for (i, g) in gradients.iter_mut().enumerate() {
                *g = raw[i] - y[i];
            }

            let (mut tree, assignments) = params.grow(&data, &gradients, n_samples);
            for node in &mut tree.nodes {
                if let TreeNode::Leaf { value } = node {
                    *value *= self.learning_rate;
                }
            }
            for (samples, value) in assignments {
                let step = value * self.learning_rate;
                for i in samples {
                    raw[i] += step;
                }
            }

            if iteration == 0 || (iteration + 1) % 50 == 0 {
                let mse = raw
                    .iter()
                    .zip(y.iter())
                    .map(|(p, t)| (p - t).powi(2))
                    .sum::<f64>()
                    / n_samples as f64;
                debug!(
                    "Boosting iteration {}: {} leaves, train mse {:.4}",
                    iteration + 1,
                    tree.nodes
                        .iter()
                        .filter(|n| matches!(n, TreeNode::Leaf { .. }))
                        .count(),
                    mse
                );
            }

            if let Some(validation) = validation.as_mut() {
                validation.add_tree(&tree);
            }
            trees.push(tree);

            if let Some(validation) = &validation {
                if should_stop(&validation.scores, self.n_iter_no_change, self.tol) {
                    debug!(
                        "Early stopping after {} iterations; validation loss {:.6}",
                        iteration + 1,
                        validation.last_loss()
                    );
                    break;
                }
            }
        }

        FittedEnsemble {
            baseline,
            n_features: x.ncols(),
            trees,
        }
    }
}

impl Regressor for HistGradientBoostingRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_training_data(x, y)?;

        let fitted = if self.early_stopping.is_active(x.nrows()) {
            let (train, held_out) =
                shuffled_partition(x.nrows(), self.validation_fraction, self.random_state)?;
            debug!(
                "Early stopping on: {} training rows, {} held out",
                train.len(),
                held_out.len()
            );
            let x_val = x.select(Axis(0), &held_out);
            let y_val = y.select(Axis(0), &held_out);
            self.boost(
                &x.select(Axis(0), &train),
                &y.select(Axis(0), &train),
                Some((&x_val, &y_val)),
            )
        } else {
            self.boost(x, y, None)
        };

        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or(HousingError::NotFitted("HistGradientBoostingRegressor"))?;
        check_prediction_width(x, fitted.n_features)?;

        Ok(x
            .rows()
            .into_iter()
            .map(|row| {
                fitted.baseline
                    + fitted
                        .trees
                        .iter()
                        .map(|tree| tree.predict_row(row))
                        .sum::<f64>()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn step_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((200, 2), |(i, j)| {
            if j == 0 {
                i as f64
            } else {
                ((i * 13) % 17) as f64
            }
        });
        let y = x.column(0).mapv(|v| if v < 100.0 { 10.0 } else { 50.0 });
        (x, y)
    }

    #[test]
    fn test_bin_thresholds_are_midpoints_of_distinct_values() {
        let column = array![3.0, 1.0, 2.0, 2.0];
        assert_eq!(bin_thresholds(column.view(), MAX_BINS), vec![1.5, 2.5]);

        let constant = array![4.0, 4.0];
        assert!(bin_thresholds(constant.view(), MAX_BINS).is_empty());
    }

    #[test]
    fn test_bin_thresholds_cap_bin_count() {
        let column = Array1::from_iter((0..1000).map(f64::from));
        let cuts = bin_thresholds(column.view(), MAX_BINS);
        assert!(cuts.len() < MAX_BINS);
        assert!(cuts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_learns_step_function() {
        let (x, y) = step_data();
        let mut model = HistGradientBoostingRegressor::new(0.1, 3, 100);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.n_trees(), 100);

        let predictions = model.predict(&array![[20.0, 0.0], [180.0, 0.0]]).unwrap();
        assert!((predictions[0] - 10.0).abs() < 0.5, "{predictions}");
        assert!((predictions[1] - 50.0).abs() < 0.5, "{predictions}");
    }

    #[test]
    fn test_small_sample_predicts_mean() {
        // Fewer rows than 2 * min_samples_leaf: every tree is a single leaf
        // with zero gradient sum, so predictions stay at the baseline.
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![1.0, 2.0, 3.0, 6.0];
        let mut model = HistGradientBoostingRegressor::new(0.1, 5, 10);
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        assert!(predictions.iter().all(|p| (p - 3.0).abs() < 1e-12));
    }

    #[test]
    fn test_leaf_count_is_bounded() {
        let (x, y) = step_data();
        let y = y + &x.column(1);
        let mut model = HistGradientBoostingRegressor::new(0.1, 10, 1).with_min_samples_leaf(1);
        model.fit(&x, &y).unwrap();

        let tree = &model.fitted.as_ref().unwrap().trees[0];
        let leaves = tree
            .nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count();
        assert!(leaves <= HistGradientBoostingRegressor::DEFAULT_MAX_LEAF_NODES);
        assert!(leaves > 2);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (x, y) = step_data();
        let mut first = HistGradientBoostingRegressor::new(0.1, 3, 20);
        let mut second = first.clone();
        first.fit(&x, &y).unwrap();
        second.fit(&x, &y).unwrap();
        assert_eq!(first.predict(&x).unwrap(), second.predict(&x).unwrap());
    }

    /// `n_rows` x 2 features with a constant target.
    fn flat_target_data(n_rows: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n_rows, 2), |(i, j)| ((i * (j + 3)) % 97) as f64);
        (x, Array1::from_elem(n_rows, 5.0))
    }

    #[test]
    fn test_should_stop_needs_a_full_window() {
        assert!(!should_stop(&[-1.0, -1.0], 2, 1e-7));
        assert!(should_stop(&[-1.0, -1.0, -1.0], 2, 1e-7));
    }

    #[test]
    fn test_should_stop_compares_against_reference_plus_tol() {
        let scores = [-1.0, -0.5, -0.5, -0.5];
        // Reference is -0.5 and neither of the last two beats it.
        assert!(should_stop(&scores, 2, 1e-7));
        // Reference is -1.0 and -0.5 improves on it.
        assert!(!should_stop(&scores, 3, 1e-7));
        // An improvement smaller than tol does not count.
        assert!(should_stop(&[-1.0, -1.0 + 1e-9, -1.0 + 2e-9], 2, 1e-7));
    }

    #[test]
    fn test_auto_early_stopping_on_large_training_set() {
        let (x, y) = flat_target_data(12_000);
        let mut model = HistGradientBoostingRegressor::new(0.1, 3, 50);
        model.fit(&x, &y).unwrap();

        // The held-out loss never moves, so the first full window stops it.
        assert_eq!(model.n_trees(), HistGradientBoostingRegressor::DEFAULT_N_ITER_NO_CHANGE);
        assert!(model.n_trees() < model.max_iter);
        let predictions = model.predict(&x.slice(ndarray::s![..5, ..]).to_owned()).unwrap();
        assert!(predictions.iter().all(|p| (p - 5.0).abs() < 1e-12));
    }

    #[test]
    fn test_auto_early_stopping_converged_step_function() {
        let x = Array2::from_shape_fn((12_000, 2), |(i, j)| {
            if j == 0 {
                (i % 100) as f64
            } else {
                ((i * 13) % 17) as f64
            }
        });
        let y = x.column(0).mapv(|v| if v < 50.0 { 10.0 } else { 50.0 });
        let mut model = HistGradientBoostingRegressor::new(0.5, 3, 200).with_random_state(7);
        model.fit(&x, &y).unwrap();

        assert!(model.n_trees() > 10, "{} trees", model.n_trees());
        assert!(model.n_trees() < model.max_iter, "{} trees", model.n_trees());
        let predictions = model.predict(&array![[20.0, 0.0], [80.0, 0.0]]).unwrap();
        assert!((predictions[0] - 10.0).abs() < 1e-3, "{predictions}");
        assert!((predictions[1] - 50.0).abs() < 1e-3, "{predictions}");
    }

    #[test]
    fn test_auto_early_stopping_off_at_threshold() {
        let (x, y) = flat_target_data(AUTO_EARLY_STOPPING_ROWS);
        let mut model = HistGradientBoostingRegressor::new(0.1, 3, 15);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.n_trees(), 15);
    }

    #[test]
    fn test_disabled_early_stopping_fits_every_tree() {
        let (x, y) = flat_target_data(12_000);
        let mut model = HistGradientBoostingRegressor::new(0.1, 3, 15)
            .with_early_stopping(EarlyStopping::Disabled);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.n_trees(), 15);
    }

    #[test]
    fn test_enabled_early_stopping_on_small_training_set() {
        let (x, y) = flat_target_data(200);
        let mut model = HistGradientBoostingRegressor::new(0.1, 3, 40)
            .with_early_stopping(EarlyStopping::Enabled);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.n_trees(), 10);
    }

    #[test]
    fn test_early_stopping_is_seeded() {
        let x = Array2::from_shape_fn((12_000, 1), |(i, _)| (i % 251) as f64);
        let y = x.column(0).mapv(|v| (v / 25.0).sin());
        let fit = |seed| {
            let mut model = HistGradientBoostingRegressor::new(0.3, 3, 60).with_random_state(seed);
            model.fit(&x, &y).unwrap();
            (model.n_trees(), model.predict(&x).unwrap())
        };
        assert_eq!(fit(3), fit(3));
    }

    #[test]
    fn test_rejects_non_finite_input() {
        let x = array![[1.0], [f64::INFINITY]];
        let mut model = HistGradientBoostingRegressor::new(0.1, 3, 5);
        assert!(model.fit(&x, &array![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_predict_before_fit() {
        let model = HistGradientBoostingRegressor::new(0.1, 3, 5);
        let err = model.predict(&array![[1.0]]).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FITTED");
    }
}

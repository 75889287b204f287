use ndarray::{Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Hard cap on histogram bins per feature; bin indices are stored as `u8`
pub const MAX_BINS: usize = 256;

/// Training rows plus each feature quantized against sorted split thresholds.
///
/// Bin `b` of a feature holds the values in `(t[b-1], t[b]]`, so "bin <= b"
/// on binned rows is the same test as "value <= t[b]" on raw rows.
#[derive(Debug, Clone)]
pub struct BinnedMatrix {
    values: Array2<f64>,
    bins: Array2<u8>,
    thresholds: Vec<Vec<f64>>,
}

impl BinnedMatrix {
    pub fn new(values: Array2<f64>, max_bins: usize) -> Self {
        let max_bins = max_bins.clamp(2, MAX_BINS);
        let thresholds: Vec<Vec<f64>> = values
            .axis_iter(Axis(1))
            .map(|column| candidate_thresholds(column, max_bins))
            .collect();
        let bins = Array2::from_shape_fn(values.dim(), |(row, feature)| {
            bin_index(&thresholds[feature], values[[row, feature]])
        });

        Self {
            values,
            bins,
            thresholds,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    pub fn n_bins(&self, feature: usize) -> usize {
        self.thresholds[feature].len() + 1
    }

    pub fn bin(&self, row: usize, feature: usize) -> usize {
        self.bins[[row, feature]] as usize
    }

    /// Upper bound (inclusive) of `bin` for `feature`
    pub fn threshold(&self, feature: usize, bin: usize) -> f64 {
        self.thresholds[feature][bin]
    }

    pub fn row(&self, row: usize) -> ArrayView1<'_, f64> {
        self.values.row(row)
    }
}

/// Every distinct value but the largest when there are few, otherwise
/// `max_bins - 1` quantiles
fn candidate_thresholds(column: ArrayView1<f64>, max_bins: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = column.iter().copied().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut distinct = sorted.clone();
    distinct.dedup();
    if distinct.len() <= max_bins {
        distinct.pop();
        return distinct;
    }

    let last = sorted.len() - 1;
    let max = sorted[last];
    let mut thresholds: Vec<f64> = (1..max_bins)
        .map(|i| sorted[i * last / max_bins])
        .collect();
    thresholds.dedup();
    thresholds.retain(|&threshold| threshold < max);
    thresholds
}

fn bin_index(thresholds: &[f64], value: f64) -> u8 {
    thresholds.partition_point(|&threshold| threshold < value) as u8
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node<L> {
    Leaf(L),
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Binary decision tree in a flat node arena
#[derive(Debug, Clone)]
pub struct Tree<L> {
    nodes: Vec<Node<L>>,
    root: usize,
}

impl<L> Tree<L> {
    /// Route a standardized row to its leaf; `x <= threshold` goes left
    pub fn leaf(&self, row: ArrayView1<f64>) -> &L {
        let mut index = self.root;
        loop {
            match &self.nodes[index] {
                Node::Leaf(value) => return value,
                Node::Split {
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

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf(_)))
            .count()
    }

    pub fn depth(&self) -> usize {
        self.depth_from(self.root)
    }

    fn depth_from(&self, index: usize) -> usize {
        match &self.nodes[index] {
            Node::Leaf(_) => 0,
            Node::Split { left, right, .. } => {
                1 + self.depth_from(*left).max(self.depth_from(*right))
            }
        }
    }
}

/// Stopping rules and feature subsampling shared by both growers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Non-constant features evaluated per node; all when `None`
    pub max_features: Option<usize>,
}

impl TreeParams {
    fn can_split(&self, n_samples: usize, depth: usize) -> bool {
        n_samples >= self.min_samples_split
            && n_samples >= 2 * self.min_samples_leaf
            && self.max_depth.map_or(true, |max_depth| depth < max_depth)
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    bin: usize,
    score: f64,
}

struct Arena<L> {
    nodes: Vec<Node<L>>,
}

impl<L> Arena<L> {
    fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, node: Node<L>) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn into_tree(self, root: usize) -> Tree<L> {
        Tree {
            nodes: self.nodes,
            root,
        }
    }
}

fn partition(matrix: &BinnedMatrix, samples: &[usize], feature: usize, bin: usize) -> (Vec<usize>, Vec<usize>) {
    samples
        .iter()
        .copied()
        .partition(|&row| matrix.bin(row, feature) <= bin)
}

/// Grow a Gini classification tree whose leaves hold class proportions.
///
/// `samples` may repeat rows (bootstrap draws). Feature order is shuffled per
/// node and constant features do not count toward `max_features`.
pub fn grow_classifier(
    matrix: &BinnedMatrix,
    labels: &[usize],
    n_classes: usize,
    samples: Vec<usize>,
    params: &TreeParams,
    rng: StdRng,
) -> Tree<Vec<f64>> {
    let mut grower = ClassifierGrower {
        matrix,
        labels,
        n_classes,
        params,
        rng,
        arena: Arena::new(),
    };
    let root = grower.grow(samples, 0);
    grower.arena.into_tree(root)
}

struct ClassifierGrower<'a> {
    matrix: &'a BinnedMatrix,
    labels: &'a [usize],
    n_classes: usize,
    params: &'a TreeParams,
    rng: StdRng,
    arena: Arena<Vec<f64>>,
}

impl ClassifierGrower<'_> {
    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let counts = self.class_counts(&samples);
        let pure = counts.iter().filter(|&&count| count > 0.0).count() <= 1;

        if !pure && self.params.can_split(samples.len(), depth) {
            if let Some(split) = self.best_split(&samples, &counts) {
                let (left, right) = partition(self.matrix, &samples, split.feature, split.bin);
                let left = self.grow(left, depth + 1);
                let right = self.grow(right, depth + 1);
                return self.arena.push(Node::Split {
                    feature: split.feature,
                    threshold: self.matrix.threshold(split.feature, split.bin),
                    left,
                    right,
                });
            }
        }

        let total = samples.len().max(1) as f64;
        self.arena
            .push(Node::Leaf(counts.iter().map(|count| count / total).collect()))
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &row in samples {
            counts[self.labels[row]] += 1.0;
        }
        counts
    }

    /// Maximizes `sum(left^2)/n_left + sum(right^2)/n_right`, which is the
    /// same as minimizing the weighted child Gini impurity
    fn best_split(&mut self, samples: &[usize], totals: &[f64]) -> Option<SplitCandidate> {
        let k = self.n_classes;
        let n = samples.len() as f64;
        let n_features = self.matrix.n_features();
        let max_features = self
            .params
            .max_features
            .unwrap_or(n_features)
            .min(n_features);

        let mut order: Vec<usize> = (0..n_features).collect();
        order.shuffle(&mut self.rng);

        let mut visited = 0;
        let mut best: Option<SplitCandidate> = None;

        for feature in order {
            if visited == max_features {
                break;
            }

            let n_bins = self.matrix.n_bins(feature);
            let mut histogram = vec![0.0; n_bins * k];
            for &row in samples {
                histogram[self.matrix.bin(row, feature) * k + self.labels[row]] += 1.0;
            }

            let occupied = histogram
                .chunks(k)
                .filter(|slot| slot.iter().any(|&count| count > 0.0))
                .count();
            if occupied <= 1 {
                continue;
            }
            visited += 1;

            let mut left = vec![0.0; k];
            let mut n_left = 0.0;
            for (bin, slot) in histogram.chunks(k).enumerate().take(n_bins - 1) {
                let in_bin: f64 = slot.iter().sum();
                if in_bin == 0.0 {
                    continue;
                }
                for (acc, count) in left.iter_mut().zip(slot) {
                    *acc += count;
                }
                n_left += in_bin;

                let n_right = n - n_left;
                let min_leaf = self.params.min_samples_leaf as f64;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }
                if n_right == 0.0 {
                    break;
                }

                let left_purity: f64 = left.iter().map(|c| c * c).sum::<f64>() / n_left;
                let right_purity: f64 = left
                    .iter()
                    .zip(totals)
                    .map(|(l, t)| (t - l) * (t - l))
                    .sum::<f64>()
                    / n_right;
                let score = left_purity + right_purity;

                if best.map_or(true, |current| score > current.score) {
                    best = Some(SplitCandidate {
                        feature,
                        bin,
                        score,
                    });
                }
            }
        }

        best
    }
}

/// Grow a least-squares regression tree on `targets`, split by Friedman's
/// improvement `n_l * n_r / n * (mean_l - mean_r)^2`. Leaf values come from
/// `leaf_value` applied to the rows reaching the leaf.
pub fn grow_regressor<F>(
    matrix: &BinnedMatrix,
    targets: &[f64],
    samples: Vec<usize>,
    params: &TreeParams,
    leaf_value: F,
) -> Tree<f64>
where
    F: Fn(&[usize]) -> f64,
{
    let mut grower = RegressorGrower {
        matrix,
        targets,
        params,
        leaf_value,
        arena: Arena::new(),
    };
    let root = grower.grow(samples, 0);
    grower.arena.into_tree(root)
}

struct RegressorGrower<'a, F> {
    matrix: &'a BinnedMatrix,
    targets: &'a [f64],
    params: &'a TreeParams,
    leaf_value: F,
    arena: Arena<f64>,
}

impl<F> RegressorGrower<'_, F>
where
    F: Fn(&[usize]) -> f64,
{
    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        if self.params.can_split(samples.len(), depth) && self.variance(&samples) > f64::EPSILON {
            if let Some(split) = self.best_split(&samples) {
                let (left, right) = partition(self.matrix, &samples, split.feature, split.bin);
                let left = self.grow(left, depth + 1);
                let right = self.grow(right, depth + 1);
                return self.arena.push(Node::Split {
                    feature: split.feature,
                    threshold: self.matrix.threshold(split.feature, split.bin),
                    left,
                    right,
                });
            }
        }

        let value = (self.leaf_value)(&samples);
        self.arena.push(Node::Leaf(value))
    }

    fn variance(&self, samples: &[usize]) -> f64 {
        let n = samples.len() as f64;
        let (sum, sum_sq) = samples.iter().fold((0.0, 0.0), |(sum, sum_sq), &row| {
            let target = self.targets[row];
            (sum + target, sum_sq + target * target)
        });
        let mean = sum / n;
        sum_sq / n - mean * mean
    }

    fn best_split(&self, samples: &[usize]) -> Option<SplitCandidate> {
        let n = samples.len() as f64;
        let total: f64 = samples.iter().map(|&row| self.targets[row]).sum();
        let min_leaf = self.params.min_samples_leaf as f64;
        let n_features = self.matrix.n_features();
        let max_features = self
            .params
            .max_features
            .unwrap_or(n_features)
            .min(n_features);

        let mut visited = 0;
        let mut best: Option<SplitCandidate> = None;

        for feature in 0..n_features {
            if visited == max_features {
                break;
            }

            let n_bins = self.matrix.n_bins(feature);
            let mut sums = vec![0.0; n_bins];
            let mut counts = vec![0.0; n_bins];
            for &row in samples {
                let bin = self.matrix.bin(row, feature);
                sums[bin] += self.targets[row];
                counts[bin] += 1.0;
            }

            if counts.iter().filter(|&&count| count > 0.0).count() <= 1 {
                continue;
            }
            visited += 1;

            let mut sum_left = 0.0;
            let mut n_left = 0.0;
            for bin in 0..n_bins - 1 {
                if counts[bin] == 0.0 {
                    continue;
                }
                sum_left += sums[bin];
                n_left += counts[bin];

                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }
                if n_right == 0.0 {
                    break;
                }

                let diff = sum_left / n_left - (total - sum_left) / n_right;
                let score = n_left * n_right / n * diff * diff;

                if best.map_or(true, |current| score > current.score) {
                    best = Some(SplitCandidate {
                        feature,
                        bin,
                        score,
                    });
                }
            }
        }

        best
    }
}

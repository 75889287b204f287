use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::classifier::tree::{grow_classifier, BinnedMatrix, Tree, TreeParams};
use crate::config::ForestConfig;
use crate::error::ModelError;

/// Bagged ensemble of Gini trees; class probability is the mean of the
/// per-tree leaf proportions
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    trees: Vec<Tree<Vec<f64>>>,
    n_classes: usize,
}

impl RandomForestClassifier {
    /// Fit on the rows listed in `samples`. Tree `i` draws its bootstrap and
    /// feature order from `seed + i`, so the result does not depend on the
    /// size of the thread pool.
    pub fn fit(
        matrix: &BinnedMatrix,
        labels: &[usize],
        samples: &[usize],
        n_classes: usize,
        config: &ForestConfig,
        seed: u64,
    ) -> Result<Self, ModelError> {
        if samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: Some(config.resolved_max_features()),
        };

        let trees = (0..config.n_trees)
            .into_par_iter()
            .map(|index| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
                let bootstrap: Vec<usize> = (0..samples.len())
                    .map(|_| samples[rng.gen_range(0..samples.len())])
                    .collect();
                grow_classifier(matrix, labels, n_classes, bootstrap, &params, rng)
            })
            .collect();

        Ok(Self { trees, n_classes })
    }

    pub fn predict_proba(&self, row: ArrayView1<f64>) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.leaf(row)) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        proba
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn toy_problem() -> (BinnedMatrix, Vec<usize>) {
        let mut values = Vec::new();
        let mut labels = Vec::new();
        for i in 0..200 {
            let x = i as f64 / 10.0;
            values.extend_from_slice(&[x, (i % 7) as f64]);
            labels.push(usize::from(x > 10.0));
        }
        let values = Array2::from_shape_vec((200, 2), values).expect("valid shape");
        (BinnedMatrix::new(values, 64), labels)
    }

    fn config(n_trees: usize) -> ForestConfig {
        ForestConfig {
            n_trees,
            max_features: Some(1),
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (matrix, labels) = toy_problem();
        let samples: Vec<usize> = (0..200).collect();
        let forest =
            RandomForestClassifier::fit(&matrix, &labels, &samples, 2, &config(10), 3).expect("fit");

        assert_eq!(forest.n_trees(), 10);
        for row in [array![1.0, 3.0], array![15.0, 0.0], array![10.0, 6.0]] {
            let proba = forest.predict_proba(row.view());
            assert_eq!(proba.len(), 2);
            assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
        assert!(forest.predict_proba(array![1.0, 3.0].view())[0] > 0.8);
        assert!(forest.predict_proba(array![19.0, 3.0].view())[1] > 0.8);
    }

    #[test]
    fn test_fit_is_independent_of_thread_count() {
        let (matrix, labels) = toy_problem();
        let samples: Vec<usize> = (0..200).collect();
        let single = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .expect("thread pool");

        let serial = single.install(|| {
            RandomForestClassifier::fit(&matrix, &labels, &samples, 2, &config(8), 11).expect("fit")
        });
        let parallel =
            RandomForestClassifier::fit(&matrix, &labels, &samples, 2, &config(8), 11).expect("fit");

        for row in [array![4.2, 1.0], array![10.05, 5.0], array![13.3, 2.0]] {
            assert_eq!(
                serial.predict_proba(row.view()),
                parallel.predict_proba(row.view())
            );
        }
    }

    #[test]
    fn test_empty_sample_set_is_rejected() {
        let (matrix, labels) = toy_problem();
        assert!(matches!(
            RandomForestClassifier::fit(&matrix, &labels, &[], 2, &config(1), 0),
            Err(ModelError::EmptyTrainingSet)
        ));
    }
}

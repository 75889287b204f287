use ndarray::ArrayView1;

use crate::classifier::tree::{grow_regressor, BinnedMatrix, Tree, TreeParams};
use crate::config::BoostingConfig;
use crate::error::ModelError;

const MIN_DENOMINATOR: f64 = 1e-150;

/// Multinomial-deviance gradient boosting: one regression tree per class per
/// stage, fit to `y_k - p_k`
#[derive(Debug, Clone)]
pub struct GradientBoostedClassifier {
    init: Vec<f64>,
    stages: Vec<Vec<Tree<f64>>>,
    learning_rate: f64,
}

impl GradientBoostedClassifier {
    pub fn fit(
        matrix: &BinnedMatrix,
        labels: &[usize],
        samples: &[usize],
        n_classes: usize,
        config: &BoostingConfig,
    ) -> Result<Self, ModelError> {
        if samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if n_classes < 2 {
            return Err(ModelError::InvalidConfig(
                "boosting needs at least two classes".to_string(),
            ));
        }

        let params = TreeParams {
            max_depth: Some(config.max_depth),
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: None,
        };
        let k = n_classes as f64;
        let init = log_priors(labels, samples, n_classes);

        // Raw scores indexed by matrix row
        let mut scores = vec![init.clone(); matrix.n_rows()];
        let mut residuals = vec![0.0; matrix.n_rows()];
        let mut hessians = vec![0.0; matrix.n_rows()];
        let mut stages = Vec::with_capacity(config.n_stages);

        for _ in 0..config.n_stages {
            let probabilities: Vec<(usize, Vec<f64>)> = samples
                .iter()
                .map(|&row| (row, softmax(&scores[row])))
                .collect();

            let mut stage = Vec::with_capacity(n_classes);
            for class in 0..n_classes {
                for (row, proba) in &probabilities {
                    let target = if labels[*row] == class { 1.0 } else { 0.0 };
                    residuals[*row] = target - proba[class];
                    hessians[*row] = proba[class] * (1.0 - proba[class]);
                }

                let tree = grow_regressor(matrix, &residuals, samples.to_vec(), &params, |rows| {
                    let numerator: f64 = rows.iter().map(|&row| residuals[row]).sum();
                    let denominator: f64 = rows.iter().map(|&row| hessians[row]).sum();
                    if denominator.abs() < MIN_DENOMINATOR {
                        0.0
                    } else {
                        numerator / denominator * (k - 1.0) / k
                    }
                });

                for &row in samples {
                    scores[row][class] += config.learning_rate * tree.leaf(matrix.row(row));
                }
                stage.push(tree);
            }
            stages.push(stage);
        }

        Ok(Self {
            init,
            stages,
            learning_rate: config.learning_rate,
        })
    }

    pub fn decision_function(&self, row: ArrayView1<f64>) -> Vec<f64> {
        let mut scores = self.init.clone();
        for stage in &self.stages {
            for (score, tree) in scores.iter_mut().zip(stage) {
                *score += self.learning_rate * tree.leaf(row);
            }
        }
        scores
    }

    pub fn predict_proba(&self, row: ArrayView1<f64>) -> Vec<f64> {
        softmax(&self.decision_function(row))
    }

    pub fn n_classes(&self) -> usize {
        self.init.len()
    }

    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }
}

/// Log class frequencies over `samples`; absent classes get a vanishing prior
fn log_priors(labels: &[usize], samples: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0.0; n_classes];
    for &row in samples {
        counts[labels[row]] += 1.0;
    }
    let n = samples.len() as f64;
    counts
        .iter()
        .map(|count| (count / n).max(f64::EPSILON).ln())
        .collect()
}

pub(crate) fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = scores.iter().map(|score| (score - max).exp()).collect();
    let total: f64 = exp.iter().sum();
    exp.iter().map(|value| value / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn three_bands() -> (BinnedMatrix, Vec<usize>) {
        let mut values = Vec::new();
        let mut labels = Vec::new();
        for i in 0..150 {
            values.push(i as f64);
            labels.push(i / 50);
        }
        let values = Array2::from_shape_vec((150, 1), values).expect("valid shape");
        (BinnedMatrix::new(values, 64), labels)
    }

    #[test]
    fn test_softmax() {
        let proba = softmax(&[0.0, 0.0]);
        assert_eq!(proba, vec![0.5, 0.5]);

        let proba = softmax(&[1000.0, 0.0, -1000.0]);
        assert!((proba[0] - 1.0).abs() < 1e-12);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_initial_scores_are_log_priors() {
        let priors = log_priors(&[0, 0, 0, 1], &[0, 1, 2, 3], 3);
        assert!((priors[0] - 0.75f64.ln()).abs() < 1e-12);
        assert!((priors[1] - 0.25f64.ln()).abs() < 1e-12);
        assert!(priors[2] < -30.0);
    }

    #[test]
    fn test_learns_banded_classes() {
        let (matrix, labels) = three_bands();
        let samples: Vec<usize> = (0..150).collect();
        let config = BoostingConfig {
            n_stages: 20,
            ..BoostingConfig::default()
        };
        let model =
            GradientBoostedClassifier::fit(&matrix, &labels, &samples, 3, &config).expect("fit");

        assert_eq!(model.n_classes(), 3);
        assert_eq!(model.n_stages(), 20);
        for (x, expected) in [(10.0, 0), (75.0, 1), (140.0, 2)] {
            let proba = model.predict_proba(array![x].view());
            assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            let best = proba
                .iter()
                .enumerate()
                .fold(0, |best, (class, &p)| if p > proba[best] { class } else { best });
            assert_eq!(best, expected);
        }
    }

    #[test]
    fn test_single_class_is_rejected() {
        let (matrix, labels) = three_bands();
        let err = GradientBoostedClassifier::fit(&matrix, &labels, &[0, 1], 1, &BoostingConfig::default())
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidConfig(_)));
    }
}

use lazy_static::lazy_static;
use ndarray::Array1;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::features::FeatureVector;
use crate::types::DiseaseCategory;

pub mod boosting;
pub mod dataset;
pub mod forest;
pub mod scaler;
pub mod tree;

pub use boosting::GradientBoostedClassifier;
pub use dataset::{Split, TrainingSet};
pub use forest::RandomForestClassifier;
pub use scaler::StandardScaler;
pub use tree::{BinnedMatrix, Tree, TreeParams};

/// Condition reported for a class index outside the category table
pub const UNKNOWN_CONDITION: &str = "Unknown Genetic Condition";

lazy_static! {
    static ref SHARED_ENGINE: Mutex<Option<Arc<ClassificationEngine>>> = Mutex::new(None);
}

/// Model output for one feature vector
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub pathogenic_probability: f64,
    pub disease_condition: String,
    /// Probability mass of the chosen disease class
    pub confidence: f64,
}

/// Held-out evaluation of a freshly trained engine
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub n_train: usize,
    pub n_test: usize,
    pub pathogenic_fraction: f64,
    pub forest_accuracy: f64,
    pub boosting_accuracy: f64,
    pub training_time: Duration,
}

/// Frozen scaler plus the pathogenicity forest and disease booster
#[derive(Debug, Clone)]
pub struct ClassificationEngine {
    scaler: StandardScaler,
    forest: RandomForestClassifier,
    boosting: GradientBoostedClassifier,
    summary: TrainingSummary,
}

impl ClassificationEngine {
    /// Synthesize the training set and fit both models
    pub fn train(config: &ModelConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let start = Instant::now();
        info!(
            samples = config.n_samples,
            trees = config.forest.n_trees,
            stages = config.boosting.n_stages,
            "Training classification models"
        );

        let data = TrainingSet::synthesize(config.n_samples, config.seed)?;
        let scaler = StandardScaler::fit(&data.features)?;
        let matrix = BinnedMatrix::new(scaler.transform(&data.features), config.max_bins);
        let split = data.split(config.test_fraction, config.seed);

        let forest = RandomForestClassifier::fit(
            &matrix,
            &data.pathogenic,
            &split.train,
            2,
            &config.forest,
            config.seed,
        )?;

        let n_disease_classes = data.disease.iter().copied().max().unwrap_or(0) + 1;
        let boosting = GradientBoostedClassifier::fit(
            &matrix,
            &data.disease,
            &split.train,
            n_disease_classes.max(2),
            &config.boosting,
        )?;

        let pathogenic_count = data.pathogenic.iter().filter(|&&label| label == 1).count();
        let summary = TrainingSummary {
            n_train: split.train.len(),
            n_test: split.test.len(),
            pathogenic_fraction: pathogenic_count as f64 / data.len() as f64,
            forest_accuracy: accuracy(&split.test, &data.pathogenic, |row| {
                forest.predict_proba(matrix.row(row))
            }),
            boosting_accuracy: accuracy(&split.test, &data.disease, |row| {
                boosting.predict_proba(matrix.row(row))
            }),
            training_time: start.elapsed(),
        };

        info!(
            "Pathogenicity model accuracy: {:.3}",
            summary.forest_accuracy
        );
        info!("Disease model accuracy: {:.3}", summary.boosting_accuracy);
        info!(
            "Models trained in {:.1}s ({} training / {} held-out rows)",
            summary.training_time.as_secs_f64(),
            summary.n_train,
            summary.n_test
        );

        Ok(Self {
            scaler,
            forest,
            boosting,
            summary,
        })
    }

    /// Process-wide engine trained with the default configuration on first
    /// use. Concurrent first callers block until the single training run ends.
    pub fn shared() -> Result<Arc<Self>, ModelError> {
        let mut slot = SHARED_ENGINE.lock();
        if let Some(engine) = slot.as_ref() {
            return Ok(Arc::clone(engine));
        }

        let engine = Arc::new(Self::train(&ModelConfig::default())?);
        *slot = Some(Arc::clone(&engine));
        Ok(engine)
    }

    pub fn is_shared_initialized() -> bool {
        SHARED_ENGINE.lock().is_some()
    }

    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        let row = self.standardize(features);

        let pathogenic = self.forest.predict_proba(row.view());
        let disease = self.boosting.predict_proba(row.view());
        let class = argmax(&disease);

        Prediction {
            pathogenic_probability: pathogenic.get(1).copied().unwrap_or(0.0),
            disease_condition: condition_for_class(class).to_string(),
            confidence: disease.get(class).copied().unwrap_or(0.0),
        }
    }

    pub fn summary(&self) -> &TrainingSummary {
        &self.summary
    }

    /// Standardized view of a feature vector, as fed to both models
    pub fn standardize(&self, features: &FeatureVector) -> Array1<f64> {
        self.scaler.transform_row(&features.to_array())
    }
}

pub fn condition_for_class(class: usize) -> &'static str {
    DiseaseCategory::from_class(class)
        .map(DiseaseCategory::condition_name)
        .unwrap_or(UNKNOWN_CONDITION)
}

/// Index of the largest value; ties go to the lowest index
pub fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold(0, |best, (index, &value)| {
            if value > values[best] {
                index
            } else {
                best
            }
        })
}

fn accuracy<F>(rows: &[usize], labels: &[usize], predict: F) -> f64
where
    F: Fn(usize) -> Vec<f64>,
{
    if rows.is_empty() {
        return 0.0;
    }
    let correct = rows
        .iter()
        .filter(|&&row| argmax(&predict(row)) == labels[row])
        .count();
    correct as f64 / rows.len() as f64
}

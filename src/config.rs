use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ModelError};
use crate::features::FEATURE_COUNT;

/// Conditions reported by the restricted report
pub const CORE_DISEASES: [&str; 7] = [
    "Hereditary Breast and Ovarian Cancer",
    "Li-Fraumeni Syndrome",
    "Cystic Fibrosis",
    "Huntington's Disease",
    "Marfan Syndrome",
    "Alzheimer's Disease",
    "Hypertrophic Cardiomyopathy",
];

/// Top-level configuration, loadable from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub model: ModelConfig,
    pub restricted_diseases: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            restricted_diseases: CORE_DISEASES.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AnalyzerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        if self.restricted_diseases.is_empty() {
            return Err(ConfigError::Invalid(
                "restricted_diseases must name at least one condition".to_string(),
            ));
        }
        Ok(())
    }
}

/// Synthetic training set and model hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub seed: u64,
    pub n_samples: usize,
    pub test_fraction: f64,
    /// Candidate split thresholds per feature are capped at `max_bins - 1`
    pub max_bins: usize,
    pub forest: ForestConfig,
    pub boosting: BoostingConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            n_samples: 10_000,
            test_fraction: 0.2,
            max_bins: 64,
            forest: ForestConfig::default(),
            boosting: BoostingConfig::default(),
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |msg: &str| Err(ModelError::InvalidConfig(msg.to_string()));

        if self.n_samples < 2 {
            return invalid("n_samples must be at least 2");
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return invalid("test_fraction must lie strictly between 0 and 1");
        }
        if !(2..=256).contains(&self.max_bins) {
            return invalid("max_bins must be between 2 and 256");
        }
        if self.forest.n_trees == 0 {
            return invalid("forest.n_trees must be positive");
        }
        if self.forest.max_depth == Some(0) {
            return invalid("forest.max_depth must be positive");
        }
        if let Some(max_features) = self.forest.max_features {
            if max_features == 0 || max_features > FEATURE_COUNT {
                return invalid("forest.max_features must be between 1 and 15");
            }
        }
        if self.boosting.n_stages == 0 {
            return invalid("boosting.n_stages must be positive");
        }
        if self.boosting.max_depth == 0 {
            return invalid("boosting.max_depth must be positive");
        }
        if !(self.boosting.learning_rate > 0.0) {
            return invalid("boosting.learning_rate must be positive");
        }
        if self.forest.min_samples_split < 2 || self.boosting.min_samples_split < 2 {
            return invalid("min_samples_split must be at least 2");
        }
        if self.forest.min_samples_leaf == 0 || self.boosting.min_samples_leaf == 0 {
            return invalid("min_samples_leaf must be positive");
        }
        Ok(())
    }
}

/// Bagged decision forest for pathogenicity probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// Unbounded when absent
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per split; defaults to the square root of the feature count
    pub max_features: Option<usize>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

impl ForestConfig {
    pub fn resolved_max_features(&self) -> usize {
        self.max_features
            .unwrap_or_else(|| ((FEATURE_COUNT as f64).sqrt() as usize).max(1))
    }
}

/// Gradient-boosted trees for the disease category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingConfig {
    pub n_stages: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_stages: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_validate() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model.forest.resolved_max_features(), 3);
        assert_eq!(config.restricted_diseases.len(), 7);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AnalyzerConfig::from_toml(
            r#"
            [model]
            n_samples = 500

            [model.forest]
            n_trees = 10
            "#,
        )
        .expect("valid config");

        assert_eq!(config.model.n_samples, 500);
        assert_eq!(config.model.forest.n_trees, 10);
        assert_eq!(config.model.seed, 42);
        assert_eq!(config.model.boosting, BoostingConfig::default());
        assert_eq!(config.restricted_diseases.len(), CORE_DISEASES.len());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = AnalyzerConfig::from_toml("[model]\ntest_fraction = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AnalyzerConfig::from_toml("[model.boosting]\nlearning_rate = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AnalyzerConfig::from_toml("restricted_diseases = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = AnalyzerConfig::from_toml("[model\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = AnalyzerConfig::from_file(Path::new("/nonexistent/analyzer.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/analyzer.toml"));
    }
}

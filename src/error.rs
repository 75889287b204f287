use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the analysis pipeline
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No variants found in the provided data")]
    NoVariants,

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors raised while building or training the classification models
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build sampling distribution: {0}")]
    Distribution(String),

    #[error("training matrix has an invalid shape")]
    Shape(#[from] ndarray::ShapeError),

    #[error("training set contains no samples")]
    EmptyTrainingSet,
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ModelError> for ConfigError {
    fn from(err: ModelError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

/// Errors raised while acquiring input text
#[derive(Debug, Error)]
pub enum InputError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Error reading file: {0}")]
    Read(std::io::Error),
}

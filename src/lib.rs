//! # Pathogenicity Analyzer
//!
//! Genomic variant ingestion and pathogenicity classification.
//!
//! ## Features
//!
//! - Format detection for VCF-like, FASTA-like and raw nucleotide text
//! - Known pathogenic variant, gene region and motif catalogs
//! - Fixed-order 15-feature extraction per variant
//! - Random forest pathogenicity probability and gradient-boosted disease
//!   category, trained once per process on a seeded synthetic set
//! - Risk tiers with condition-specific clinical recommendations
//! - Full and core-disease reports as JSON, CSV or TSV
//!
//! The locus conservation and region scores are deterministic placeholders
//! derived from chromosome and position, not measured conservation data.

pub mod analysis;
pub mod classifier;
pub mod config;
pub mod error;
pub mod features;
pub mod input;
pub mod output;
pub mod parsers;
pub mod registry;
pub mod types;

// Re-export key types
pub use analysis::{RiskStratifier, VariantAnalyzer};
pub use classifier::{ClassificationEngine, Prediction, TrainingSummary};
pub use config::{AnalyzerConfig, ModelConfig, CORE_DISEASES};
pub use error::{AnalysisError, ConfigError, InputError, ModelError};
pub use features::FeatureVector;
pub use output::{
    AnalysisOutput, ErrorReport, Report, ReportFormat, ReportGenerator, RestrictedReport,
    ResultAssembler,
};
pub use parsers::{detect_format, FileParser, ParsedVariants};
pub use registry::{GeneRegionRegistry, KnownVariantRegistry, MotifCatalog};
pub use types::*;

/// Full report for `content` using the built-in catalogs and shared engine
pub fn analyze(content: &str) -> Result<Report, AnalysisError> {
    VariantAnalyzer::new().analyze(content)
}

/// Report limited to the conditions in `diseases`
pub fn analyze_restricted(content: &str, diseases: &[String]) -> Result<RestrictedReport, AnalysisError> {
    VariantAnalyzer::new().analyze_restricted(content, diseases)
}

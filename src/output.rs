use anyhow::{Context, Result};
use chrono::Local;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::RiskStratifier;
use crate::error::AnalysisError;
use crate::types::*;

/// Predictions at or below this probability are left out of the full report
pub const REPORT_PROBABILITY_THRESHOLD: f64 = 0.2;

/// Restricted-report confidences never exceed this
pub const CONFIDENCE_CAP: f64 = 0.99;

pub const RESTRICTED_ANALYSIS_METHOD: &str = "Ensemble ML Model (Core Diseases Only)";
pub const RESTRICTED_MODEL_CONFIDENCE: f64 = 0.95;

/// Full analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub success: bool,
    pub variants: Vec<ReportedVariant>,
    pub total_analyzed: usize,
    pub significant_variants: usize,
}

/// One significant variant in a [`Report`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedVariant {
    pub id: String,
    pub variant: String,
    pub chromosome: String,
    pub position: u64,
    pub gene: String,
    pub risk_level: RiskLevel,
    pub condition: String,
    pub confidence: f64,
    pub description: String,
    pub recommendations: Vec<String>,
    pub is_known_pathogenic: bool,
}

/// Result limited to a whitelist of supported conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestrictedReport {
    pub pathogenic_variants: Vec<PredictionResult>,
    pub total_variants_analyzed: usize,
    pub analysis_method: String,
    pub model_confidence: f64,
    pub processing_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl From<&AnalysisError> for ErrorReport {
    fn from(err: &AnalysisError) -> Self {
        Self::new(err.to_string())
    }
}

/// Anything the analyzer can hand back to a caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutput {
    Full(Report),
    Restricted(RestrictedReport),
    Error(ErrorReport),
}

impl From<Result<Report, AnalysisError>> for AnalysisOutput {
    fn from(result: Result<Report, AnalysisError>) -> Self {
        match result {
            Ok(report) => AnalysisOutput::Full(report),
            Err(err) => AnalysisOutput::Error(ErrorReport::from(&err)),
        }
    }
}

impl From<Result<RestrictedReport, AnalysisError>> for AnalysisOutput {
    fn from(result: Result<RestrictedReport, AnalysisError>) -> Self {
        match result {
            Ok(report) => AnalysisOutput::Restricted(report),
            Err(err) => AnalysisOutput::Error(ErrorReport::from(&err)),
        }
    }
}

/// Turns per-variant predictions into report structures
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAssembler {
    stratifier: RiskStratifier,
}

impl ResultAssembler {
    pub fn new() -> Self {
        Self {
            stratifier: RiskStratifier::new(),
        }
    }

    pub fn stratifier(&self) -> RiskStratifier {
        self.stratifier
    }

    pub fn full_report(&self, predictions: &[PredictionResult], total_analyzed: usize) -> Report {
        let variants: Vec<ReportedVariant> = predictions
            .iter()
            .filter(|prediction| prediction.pathogenic_probability > REPORT_PROBABILITY_THRESHOLD)
            .enumerate()
            .map(|(index, prediction)| ReportedVariant {
                id: (index + 1).to_string(),
                variant: prediction.variant.clone(),
                chromosome: prediction.chromosome.clone(),
                position: prediction.position,
                gene: prediction.gene.clone(),
                risk_level: prediction.risk_level,
                condition: prediction.disease_condition.clone(),
                confidence: prediction.confidence,
                description: describe(prediction),
                recommendations: self
                    .stratifier
                    .recommendations(&prediction.disease_condition)
                    .iter()
                    .map(|item| item.to_string())
                    .collect(),
                is_known_pathogenic: prediction.is_known_pathogenic,
            })
            .collect();

        Report {
            success: true,
            significant_variants: variants.len(),
            variants,
            total_analyzed,
        }
    }

    pub fn restricted_report(
        &self,
        predictions: Vec<PredictionResult>,
        total_analyzed: usize,
        diseases: &[String],
        elapsed: Duration,
    ) -> RestrictedReport {
        let pathogenic_variants = predictions
            .into_iter()
            .filter(|prediction| {
                diseases
                    .iter()
                    .any(|disease| *disease == prediction.disease_condition)
            })
            .map(|mut prediction| {
                prediction.confidence = prediction.confidence.min(CONFIDENCE_CAP);
                prediction
            })
            .collect();

        RestrictedReport {
            pathogenic_variants,
            total_variants_analyzed: total_analyzed,
            analysis_method: RESTRICTED_ANALYSIS_METHOD.to_string(),
            model_confidence: RESTRICTED_MODEL_CONFIDENCE,
            processing_time: format!("{:.1}s", elapsed.as_secs_f64()),
        }
    }
}

/// Clinical description with the probability as a one-decimal percentage
pub fn describe(prediction: &PredictionResult) -> String {
    let percent = prediction.pathogenic_probability * 100.0;
    if prediction.is_known_pathogenic {
        format!(
            "Known pathogenic variant in {} gene with {:.1}% pathogenic probability. This variant is documented in clinical databases.",
            prediction.gene, percent
        )
    } else {
        format!(
            "Variant of uncertain significance with {:.1}% pathogenic probability based on computational analysis.",
            percent
        )
    }
}

/// Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
    Tsv,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Tsv => "tsv",
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            ReportFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

/// Report writer for analysis output
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportGenerator {
    pretty: bool,
}

impl ReportGenerator {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Render `output` into `writer`
    pub fn write<W: Write>(&self, output: &AnalysisOutput, format: ReportFormat, mut writer: W) -> Result<()> {
        match format {
            ReportFormat::Json => {
                let serialized = if self.pretty {
                    serde_json::to_writer_pretty(&mut writer, output)
                } else {
                    serde_json::to_writer(&mut writer, output)
                };
                serialized.with_context(|| "Failed to serialize results to JSON")?;
                writeln!(writer)?;
                Ok(())
            }
            ReportFormat::Csv | ReportFormat::Tsv => self.write_delimited(output, format.delimiter(), writer),
        }
    }

    /// Write `output` to a timestamped file inside `output_dir`
    pub fn write_to_dir(&self, output: &AnalysisOutput, format: ReportFormat, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let filename = output_dir.join(format!("variant_report_{}.{}", timestamp, format.extension()));

        let file = fs::File::create(&filename)
            .with_context(|| format!("Failed to create report file {}", filename.display()))?;
        self.write(output, format, file)
            .with_context(|| format!("Failed to write report to {}", filename.display()))?;

        Ok(filename)
    }

    fn write_delimited<W: Write>(&self, output: &AnalysisOutput, delimiter: u8, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(writer);

        match output {
            AnalysisOutput::Full(report) => {
                wtr.write_record([
                    "id",
                    "variant",
                    "chromosome",
                    "position",
                    "gene",
                    "risk_level",
                    "condition",
                    "confidence",
                    "is_known_pathogenic",
                    "description",
                    "recommendations",
                ])?;

                for variant in &report.variants {
                    wtr.write_record(&[
                        variant.id.clone(),
                        variant.variant.clone(),
                        variant.chromosome.clone(),
                        variant.position.to_string(),
                        variant.gene.clone(),
                        variant.risk_level.to_string(),
                        variant.condition.clone(),
                        format!("{:.4}", variant.confidence),
                        variant.is_known_pathogenic.to_string(),
                        variant.description.clone(),
                        variant.recommendations.join("; "),
                    ])?;
                }
            }
            AnalysisOutput::Restricted(report) => {
                wtr.write_record([
                    "variant",
                    "chromosome",
                    "position",
                    "gene",
                    "pathogenic_probability",
                    "disease_condition",
                    "confidence",
                    "risk_level",
                    "conservation_score",
                    "gene_region",
                    "is_known_pathogenic",
                ])?;

                for prediction in &report.pathogenic_variants {
                    wtr.write_record(&[
                        prediction.variant.clone(),
                        prediction.chromosome.clone(),
                        prediction.position.to_string(),
                        prediction.gene.clone(),
                        format!("{:.4}", prediction.pathogenic_probability),
                        prediction.disease_condition.clone(),
                        format!("{:.4}", prediction.confidence),
                        prediction.risk_level.to_string(),
                        format!("{:.4}", prediction.conservation_score),
                        format!("{:?}", prediction.gene_region),
                        prediction.is_known_pathogenic.to_string(),
                    ])?;
                }
            }
            AnalysisOutput::Error(report) => {
                wtr.write_record(["error"])?;
                wtr.write_record([report.error.as_str()])?;
            }
        }

        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prediction(probability: f64, condition: &str, known: bool) -> PredictionResult {
        PredictionResult {
            variant: format!("1:{}:A>G", (probability * 1000.0) as u64),
            chromosome: "1".to_string(),
            position: (probability * 1000.0) as u64,
            gene: "BRCA1".to_string(),
            pathogenic_probability: probability,
            disease_condition: condition.to_string(),
            confidence: 0.995,
            risk_level: RiskStratifier::new().risk_level(probability),
            conservation_score: 0.7,
            gene_region: GeneRegion::Exonic,
            is_known_pathogenic: known,
        }
    }

    #[test]
    fn test_full_report_filters_and_numbers_variants() {
        let predictions = vec![
            prediction(0.95, "Hereditary Breast and Ovarian Cancer", true),
            prediction(0.2, "Benign Variant", false),
            prediction(0.35, "Metabolic Disorder", false),
        ];
        let report = ResultAssembler::new().full_report(&predictions, 3);

        assert!(report.success);
        assert_eq!(report.total_analyzed, 3);
        assert_eq!(report.significant_variants, 2);
        assert_eq!(
            report.variants.iter().map(|v| v.id.as_str()).collect::<Vec<_>>(),
            vec!["1", "2"]
        );
        assert_eq!(
            report.variants[0].description,
            "Known pathogenic variant in BRCA1 gene with 95.0% pathogenic probability. This variant is documented in clinical databases."
        );
        assert_eq!(
            report.variants[1].description,
            "Variant of uncertain significance with 35.0% pathogenic probability based on computational analysis."
        );
        assert_eq!(report.variants[1].recommendations[0], "Comprehensive metabolic panel testing");
        assert_eq!(report.variants[0].risk_level, RiskLevel::High);
    }

    #[test]
    fn test_full_report_json_keys() {
        let report = ResultAssembler::new().full_report(&[prediction(0.95, "Cystic Fibrosis", true)], 1);
        let value = serde_json::to_value(&report).expect("serializable");

        let variant = &value["variants"][0];
        assert_eq!(variant["riskLevel"], "high");
        assert_eq!(variant["isKnownPathogenic"], true);
        assert_eq!(variant["chromosome"], "1");
        assert_eq!(value["significant_variants"], 1);
        assert_eq!(value["success"], true);
    }

    #[test]
    fn test_restricted_report_filters_and_caps() {
        let diseases = vec!["Cystic Fibrosis".to_string()];
        let report = ResultAssembler::new().restricted_report(
            vec![
                prediction(0.98, "Cystic Fibrosis", true),
                prediction(0.7, "Metabolic Disorder", false),
            ],
            2,
            &diseases,
            Duration::from_millis(1300),
        );

        assert_eq!(report.pathogenic_variants.len(), 1);
        assert_eq!(report.pathogenic_variants[0].confidence, CONFIDENCE_CAP);
        assert_eq!(report.total_variants_analyzed, 2);
        assert_eq!(report.analysis_method, RESTRICTED_ANALYSIS_METHOD);
        assert_eq!(report.model_confidence, 0.95);
        assert_eq!(report.processing_time, "1.3s");
    }

    #[test]
    fn test_error_output_serializes_flat() {
        let output = AnalysisOutput::from(Err::<Report, _>(AnalysisError::NoVariants));
        assert_eq!(
            serde_json::to_string(&output).expect("serializable"),
            r#"{"error":"No variants found in the provided data"}"#
        );
    }

    #[test]
    fn test_tsv_output() {
        let report = ResultAssembler::new().full_report(&[prediction(0.95, "Cystic Fibrosis", true)], 1);
        let mut buffer = Vec::new();
        ReportGenerator::new(false)
            .write(&AnalysisOutput::Full(report), ReportFormat::Tsv, &mut buffer)
            .expect("writable");

        let text = String::from_utf8(buffer).expect("utf-8");
        let mut lines = text.lines();
        assert!(lines.next().expect("header").starts_with("id\tvariant\tchromosome"));
        let row: Vec<&str> = lines.next().expect("row").split('\t').collect();
        assert_eq!(row[0], "1");
        assert_eq!(row[5], "high");
        assert_eq!(row[7], "0.9950");
        assert!(row[10].starts_with("Pulmonary function testing; "));
    }
}

use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::classifier::ClassificationEngine;
use crate::error::{AnalysisError, ModelError};
use crate::features::FeatureVector;
use crate::output::{Report, RestrictedReport, ResultAssembler};
use crate::parsers::{FileParser, ParsedVariants};
use crate::types::*;

/// Confidence attached to every registry hit
pub const KNOWN_VARIANT_CONFIDENCE: f64 = 0.95;

/// Probabilities strictly above this are high risk
pub const HIGH_RISK_THRESHOLD: f64 = 0.8;

/// Probabilities strictly above this (and not high) are medium risk
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.6;

/// Parse, classify and stratify variants found in raw text
pub struct VariantAnalyzer<'a> {
    parser: FileParser<'a>,
    engine: Option<Arc<ClassificationEngine>>,
    assembler: ResultAssembler,
}

impl VariantAnalyzer<'static> {
    pub fn new() -> Self {
        Self::with_parser(FileParser::new())
    }
}

impl Default for VariantAnalyzer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> VariantAnalyzer<'a> {
    pub fn with_parser(parser: FileParser<'a>) -> Self {
        Self {
            parser,
            engine: None,
            assembler: ResultAssembler::new(),
        }
    }

    /// Use `engine` instead of the process-wide shared one
    pub fn with_engine(mut self, engine: Arc<ClassificationEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn extract_variants(&self, content: &str) -> ParsedVariants {
        self.parser.parse(content)
    }

    /// Registry hits keep their catalogued condition; everything else goes
    /// through the models. The engine is only resolved when at least one
    /// variant needs it.
    pub fn predict(&self, variants: &[VariantRecord]) -> Result<Vec<PredictionResult>, ModelError> {
        let engine = if variants.iter().any(|variant| !variant.known_pathogenic) {
            Some(self.resolve_engine()?)
        } else {
            None
        };

        let stratifier = self.assembler.stratifier();
        Ok(variants
            .par_iter()
            .map(|variant| {
                let (pathogenic_probability, disease_condition, confidence) =
                    match (variant.known_pathogenic, engine.as_deref()) {
                        (false, Some(engine)) => {
                            let prediction = engine.predict(&FeatureVector::from(variant));
                            (
                                prediction.pathogenic_probability,
                                prediction.disease_condition,
                                prediction.confidence,
                            )
                        }
                        _ => (
                            variant.known_pathogenicity,
                            variant.known_condition.clone(),
                            KNOWN_VARIANT_CONFIDENCE,
                        ),
                    };

                PredictionResult {
                    variant: variant.original_variant.clone(),
                    chromosome: variant.chromosome.to_string(),
                    position: variant.position,
                    gene: variant.gene_name.clone(),
                    pathogenic_probability,
                    disease_condition,
                    confidence,
                    risk_level: stratifier.risk_level(pathogenic_probability),
                    conservation_score: variant.conservation_score,
                    gene_region: variant.gene_region,
                    is_known_pathogenic: variant.known_pathogenic,
                }
            })
            .collect())
    }

    /// Full report of every variant above the reporting threshold
    pub fn analyze(&self, content: &str) -> Result<Report, AnalysisError> {
        let parsed = self.extract_variants(content);
        if parsed.variants.is_empty() {
            return Err(AnalysisError::NoVariants);
        }
        info!("Found {} variants to analyze", parsed.variants.len());

        let predictions = self.predict(&parsed.variants)?;
        let report = self
            .assembler
            .full_report(&predictions, parsed.variants.len());
        info!(
            "Analysis complete. Found {} significant variants.",
            report.significant_variants
        );
        Ok(report)
    }

    /// Report limited to conditions named in `diseases`
    pub fn analyze_restricted(
        &self,
        content: &str,
        diseases: &[String],
    ) -> Result<RestrictedReport, AnalysisError> {
        let start = Instant::now();
        let parsed = self.extract_variants(content);
        if parsed.variants.is_empty() {
            return Err(AnalysisError::NoVariants);
        }

        let predictions = self.predict(&parsed.variants)?;
        Ok(self.assembler.restricted_report(
            predictions,
            parsed.variants.len(),
            diseases,
            start.elapsed(),
        ))
    }

    fn resolve_engine(&self) -> Result<Arc<ClassificationEngine>, ModelError> {
        match &self.engine {
            Some(engine) => Ok(Arc::clone(engine)),
            None => ClassificationEngine::shared(),
        }
    }
}

/// Condition keywords and the follow-up actions they trigger
struct RecommendationRule {
    keywords: &'static [&'static str],
    recommendations: [&'static str; 5],
}

// Checked in order; the first rule with a keyword inside the condition wins.
const RECOMMENDATION_RULES: [RecommendationRule; 17] = [
    RecommendationRule {
        keywords: &["Cancer", "Lynch", "Li-Fraumeni"],
        recommendations: [
            "Genetic counseling strongly recommended",
            "Enhanced cancer screening protocols",
            "Consider prophylactic surgical options",
            "Family cascade testing advised",
            "Regular oncology consultation",
        ],
    },
    RecommendationRule {
        keywords: &["Huntington"],
        recommendations: [
            "Neurological evaluation with movement disorder specialist",
            "Genetic counseling for family planning",
            "Cognitive and psychiatric assessment",
            "Presymptomatic testing considerations",
            "Support group referral",
        ],
    },
    RecommendationRule {
        keywords: &["Cystic Fibrosis"],
        recommendations: [
            "Pulmonary function testing",
            "Genetic counseling for family planning",
            "Specialized CF care team consultation",
            "Carrier screening for family members",
            "Respiratory therapy evaluation",
        ],
    },
    RecommendationRule {
        keywords: &["Marfan"],
        recommendations: [
            "Comprehensive cardiovascular evaluation",
            "Ophthalmologic examination",
            "Orthopedic assessment",
            "Activity restrictions as indicated",
            "Family screening recommended",
        ],
    },
    RecommendationRule {
        keywords: &["Alzheimer"],
        recommendations: [
            "Neuropsychological evaluation",
            "Lifestyle modifications for brain health",
            "Regular cognitive monitoring",
            "Genetic counseling consultation",
            "Consider research participation",
        ],
    },
    RecommendationRule {
        keywords: &["Cardiomyopathy", "Cardiovascular", "Long QT"],
        recommendations: [
            "Comprehensive cardiac evaluation",
            "Echocardiogram and ECG monitoring",
            "Activity restriction assessment",
            "Family cascade screening",
            "Cardiology consultation",
        ],
    },
    RecommendationRule {
        keywords: &["Hemochromatosis"],
        recommendations: [
            "Iron studies and ferritin monitoring",
            "Therapeutic phlebotomy if indicated",
            "Liver function assessment",
            "Family screening recommended",
            "Dietary iron counseling",
        ],
    },
    RecommendationRule {
        keywords: &["Metabolic"],
        recommendations: [
            "Comprehensive metabolic panel testing",
            "Dietary modifications and nutritional counseling",
            "Regular metabolic monitoring",
            "Pharmacogenomic considerations for drug therapy",
            "Endocrinology consultation if indicated",
        ],
    },
    RecommendationRule {
        keywords: &["Duchenne", "Muscular Dystrophy"],
        recommendations: [
            "Comprehensive neuromuscular evaluation",
            "Cardiac and pulmonary function monitoring",
            "Physical therapy and mobility assessment",
            "Genetic counseling for family planning",
            "Multidisciplinary care team coordination",
        ],
    },
    RecommendationRule {
        keywords: &["Spinal Muscular Atrophy"],
        recommendations: [
            "Neurological evaluation and motor function assessment",
            "Respiratory function monitoring",
            "Consider disease-modifying therapies",
            "Physical and occupational therapy",
            "Genetic counseling consultation",
        ],
    },
    RecommendationRule {
        keywords: &["Tay-Sachs", "Gaucher"],
        recommendations: [
            "Specialized metabolic disease consultation",
            "Enzyme replacement therapy evaluation",
            "Neurological and developmental monitoring",
            "Genetic counseling for family planning",
            "Carrier screening for family members",
        ],
    },
    RecommendationRule {
        keywords: &["Hemophilia"],
        recommendations: [
            "Hematology consultation for bleeding disorder management",
            "Factor replacement therapy planning",
            "Activity modification and safety counseling",
            "Regular monitoring for inhibitor development",
            "Genetic counseling for family members",
        ],
    },
    RecommendationRule {
        keywords: &["Alpha-1 Antitrypsin"],
        recommendations: [
            "Pulmonary function testing and monitoring",
            "Liver function assessment",
            "Alpha-1 antitrypsin replacement therapy consideration",
            "Smoking cessation counseling",
            "Family screening recommended",
        ],
    },
    RecommendationRule {
        keywords: &["Parkinson"],
        recommendations: [
            "Movement disorder specialist evaluation",
            "Dopamine transporter imaging if indicated",
            "Genetic counseling consultation",
            "Regular neurological monitoring",
            "Consider research participation",
        ],
    },
    RecommendationRule {
        keywords: &["Amyotrophic Lateral Sclerosis", "ALS"],
        recommendations: [
            "Neuromuscular specialist consultation",
            "Electromyography and nerve conduction studies",
            "Multidisciplinary ALS care team",
            "Genetic counseling for family members",
            "Consider clinical trial participation",
        ],
    },
    RecommendationRule {
        keywords: &["Frontotemporal Dementia"],
        recommendations: [
            "Neuropsychological evaluation",
            "Brain imaging studies",
            "Genetic counseling consultation",
            "Behavioral and psychiatric assessment",
            "Family support and education",
        ],
    },
    RecommendationRule {
        keywords: &["Hypercholesterolemia"],
        recommendations: [
            "Lipid profile monitoring and management",
            "Cardiovascular risk assessment",
            "Statin therapy consideration",
            "Lifestyle modifications counseling",
            "Family cascade screening",
        ],
    },
];

const GENERAL_RECOMMENDATIONS: [&str; 5] = [
    "Clinical correlation recommended",
    "Consider confirmatory testing",
    "Genetic counseling consultation",
    "Regular health monitoring",
    "Follow current medical guidelines",
];

/// Maps probabilities to risk tiers and conditions to clinical follow-up
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskStratifier;

impl RiskStratifier {
    pub fn new() -> Self {
        Self
    }

    pub fn risk_level(&self, pathogenic_probability: f64) -> RiskLevel {
        if pathogenic_probability > HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if pathogenic_probability > MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn recommendations(&self, condition: &str) -> &'static [&'static str; 5] {
        RECOMMENDATION_RULES
            .iter()
            .find(|rule| rule.keywords.iter().any(|keyword| condition.contains(keyword)))
            .map(|rule| &rule.recommendations)
            .unwrap_or(&GENERAL_RECOMMENDATIONS)
    }
}

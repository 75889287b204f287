use pathogenicity_analyzer::config::{BoostingConfig, ForestConfig};
use pathogenicity_analyzer::{
    analyze, analyze_restricted, detect_format, AnalysisOutput, ClassificationEngine, FileFormat,
    GeneRegion, ModelConfig, ReportFormat, ReportGenerator, RiskLevel, VariantAnalyzer,
    CORE_DISEASES,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const BRCA1_LINE: &str = "17\t41197694\t.\tA\tT\t50\tPASS\tDP=80\n";
const CFTR_MOTIF: &str = "GAAAATATCATCTTTGGTGTTTCC";

fn small_engine() -> Arc<ClassificationEngine> {
    let config = ModelConfig {
        n_samples: 300,
        forest: ForestConfig {
            n_trees: 5,
            ..ForestConfig::default()
        },
        boosting: BoostingConfig {
            n_stages: 5,
            ..BoostingConfig::default()
        },
        ..ModelConfig::default()
    };
    Arc::new(ClassificationEngine::train(&config).expect("training succeeds"))
}

fn core_diseases() -> Vec<String> {
    CORE_DISEASES.iter().map(|d| d.to_string()).collect()
}

#[test]
fn test_known_brca1_variant_is_reported() {
    let report = analyze(BRCA1_LINE).expect("variants found");

    assert!(report.success);
    assert_eq!(report.total_analyzed, 1);
    assert_eq!(report.significant_variants, 1);

    let variant = &report.variants[0];
    assert_eq!(variant.id, "1");
    assert_eq!(variant.variant, "17:41197694:A>T");
    assert_eq!(variant.gene, "BRCA1");
    assert_eq!(variant.chromosome, "17");
    assert_eq!(variant.condition, "Hereditary Breast and Ovarian Cancer");
    assert!(variant.is_known_pathogenic);
    assert_eq!(variant.risk_level, RiskLevel::High);
    assert_eq!(variant.recommendations.len(), 5);
    assert!(variant.description.contains("95.0%"));

    let predictions = VariantAnalyzer::new()
        .predict(&VariantAnalyzer::new().extract_variants(BRCA1_LINE).variants)
        .expect("registry hits need no model");
    assert_eq!(predictions[0].pathogenic_probability, 0.95);
    assert_eq!(predictions[0].confidence, 0.95);
}

#[test]
fn test_raw_sequence_features() {
    let content = "ATCG".repeat(100);
    assert_eq!(detect_format(&content), FileFormat::RawDna);

    let parsed = VariantAnalyzer::new().extract_variants(&content);
    assert_eq!(parsed.variants.len(), 1);

    let variant = &parsed.variants[0];
    assert_eq!(variant.gc_content, 0.5);
    assert_eq!(variant.gene_region, GeneRegion::Intronic);
    assert_eq!(variant.original_variant, "raw_sequence_400bp");
    assert!(!variant.known_pathogenic);
}

#[test]
fn test_raw_sequence_goes_through_models() {
    let content = "ATCG".repeat(100);
    let report = VariantAnalyzer::new()
        .with_engine(small_engine())
        .analyze(&content)
        .expect("one variant found");

    assert_eq!(report.total_analyzed, 1);
    assert!(report.significant_variants <= 1);
    for variant in &report.variants {
        assert!(!variant.is_known_pathogenic);
        assert!((0.0..=1.0).contains(&variant.confidence));
    }
}

#[test]
fn test_empty_input_yields_error_record() {
    let output = AnalysisOutput::from(analyze(""));
    let json = serde_json::to_string(&output).expect("serializable");
    assert_eq!(json, r#"{"error":"No variants found in the provided data"}"#);

    let restricted = AnalysisOutput::from(analyze_restricted("   \n", &core_diseases()));
    assert!(matches!(restricted, AnalysisOutput::Error(_)));
}

#[test]
fn test_fasta_motif_is_flagged() {
    let content = format!(">patient chr7\nTTTTTTTTTT{}AAAAAAAAAA\n", CFTR_MOTIF);
    let report = analyze(&content).expect("motif found");

    assert_eq!(report.total_analyzed, 1);
    let variant = &report.variants[0];
    assert!(variant.is_known_pathogenic);
    assert_eq!(variant.gene, "CFTR");
    assert_eq!(variant.condition, "Cystic Fibrosis");
    assert_eq!(variant.chromosome, "7");
    assert_eq!(variant.position, 10);
}

#[test]
fn test_restricted_report_keeps_core_diseases() {
    // HTT and a Lynch syndrome MLH1 hit; only the former is a core disease
    let content = "4\t3074877\t.\tC\tG\t60\tPASS\t.\n3\t37034840\t.\tG\tA\t60\tPASS\t.\n";
    let report = analyze_restricted(content, &core_diseases()).expect("variants found");

    assert_eq!(report.total_variants_analyzed, 2);
    assert_eq!(report.pathogenic_variants.len(), 1);
    let prediction = &report.pathogenic_variants[0];
    assert_eq!(prediction.disease_condition, "Huntington's Disease");
    assert_eq!(prediction.gene, "HTT");
    assert!(prediction.confidence <= 0.99);
    assert_eq!(report.analysis_method, "Ensemble ML Model (Core Diseases Only)");
    assert!(report.processing_time.ends_with('s'));
}

#[test]
fn test_reports_written_to_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = AnalysisOutput::from(analyze(BRCA1_LINE));
    let generator = ReportGenerator::new(true);

    let json_path = generator
        .write_to_dir(&output, ReportFormat::Json, dir.path())
        .expect("json written");
    assert_eq!(json_path.extension().and_then(|e| e.to_str()), Some("json"));
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).expect("readable")).expect("valid json");
    assert_eq!(json["variants"][0]["gene"], "BRCA1");

    let csv_path = generator
        .write_to_dir(&output, ReportFormat::Csv, dir.path().join("nested").as_path())
        .expect("csv written");
    let csv = std::fs::read_to_string(&csv_path).expect("readable");
    let mut lines = csv.lines();
    assert!(lines.next().expect("header").starts_with("id,variant,chromosome"));
    assert!(lines.next().expect("row").starts_with("1,17:41197694:A>T,17,41197694,BRCA1,high"));
}

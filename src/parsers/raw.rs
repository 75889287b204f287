use crate::features::{gc_content, sequence_conservation, sequence_region};
use crate::parsers::VariantParser;
use crate::types::*;

/// Composition-based analysis of a bare nucleotide string.
///
/// The whole sequence becomes a single unknown variant on chromosome 1 at
/// position 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawSequenceAnalyzer;

impl RawSequenceAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Strip whitespace, upper-case and summarize. `None` for an empty sequence.
    pub fn analyze(&self, sequence: &str) -> Option<VariantRecord> {
        let sequence: String = sequence
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if sequence.is_empty() {
            return None;
        }

        let length = sequence.len();
        let gc = gc_content(&sequence);

        Some(VariantRecord {
            chromosome: 1,
            position: 0,
            ref_length: length,
            alt_length: length,
            quality_score: 40.0,
            variant_type: VariantType::Snv,
            gc_content: gc,
            is_transition: false,
            is_transversion: false,
            indel_length: 0,
            conservation_score: sequence_conservation(&sequence),
            gene_region: sequence_region(gc),
            depth: 50.0,
            allele_frequency: 0.5,
            mapping_quality: 40.0,
            original_variant: format!("raw_sequence_{}bp", length),
            known_pathogenic: false,
            gene_name: "Unknown".to_string(),
            known_condition: "Unknown".to_string(),
            known_pathogenicity: 0.0,
        })
    }
}

impl VariantParser for RawSequenceAnalyzer {
    fn parse(&self, content: &str) -> Vec<VariantRecord> {
        self.analyze(content).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_atcg() {
        let sequence = "ATCG".repeat(100);
        let variant = RawSequenceAnalyzer::new()
            .analyze(&sequence)
            .expect("non-empty sequence");

        assert_eq!(variant.gc_content, 0.5);
        assert_eq!(variant.gene_region, GeneRegion::Intronic);
        assert_eq!(variant.conservation_score, 0.5);
        assert_eq!(variant.ref_length, 400);
        assert_eq!(variant.chromosome, 1);
        assert_eq!(variant.position, 0);
        assert_eq!(variant.original_variant, "raw_sequence_400bp");
        assert!(!variant.known_pathogenic);
        assert_eq!(variant.gene_name, "Unknown");
    }

    #[test]
    fn test_whitespace_and_case_are_normalized() {
        let variant = RawSequenceAnalyzer::new()
            .analyze("gg cc\nat\t")
            .expect("non-empty sequence");
        assert_eq!(variant.ref_length, 6);
        assert!((variant.gc_content - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(variant.gene_region, GeneRegion::Exonic);
    }

    #[test]
    fn test_empty_sequence_has_no_record() {
        assert!(RawSequenceAnalyzer::new().analyze(" \n ").is_none());
        assert!(RawSequenceAnalyzer::new().parse("").is_empty());
    }
}

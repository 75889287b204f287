use serde::{Deserialize, Serialize};
use std::fmt;

/// Variant class derived from reference/alternate allele lengths
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VariantType {
    Snv,
    Insertion,
    Deletion,
    Complex,
}

impl VariantType {
    /// Four-way rule: 1/1 is an SNV, shorter ref an insertion, longer ref a
    /// deletion, anything else (equal multi-base lengths) complex.
    pub fn classify(ref_length: usize, alt_length: usize) -> Self {
        if ref_length == 1 && alt_length == 1 {
            VariantType::Snv
        } else if ref_length < alt_length {
            VariantType::Insertion
        } else if ref_length > alt_length {
            VariantType::Deletion
        } else {
            VariantType::Complex
        }
    }

    /// Numeric code used in the feature vector
    pub fn code(self) -> u8 {
        match self {
            VariantType::Snv => 0,
            VariantType::Insertion => 1,
            VariantType::Deletion => 2,
            VariantType::Complex => 3,
        }
    }

    pub fn is_indel(self) -> bool {
        matches!(self, VariantType::Insertion | VariantType::Deletion)
    }
}

/// Coarse functional region of a locus
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GeneRegion {
    Intergenic,
    Exonic,
    Intronic,
    #[serde(rename = "UTR")]
    Utr,
}

impl GeneRegion {
    pub fn from_code(code: u64) -> Self {
        match code % 4 {
            0 => GeneRegion::Intergenic,
            1 => GeneRegion::Exonic,
            2 => GeneRegion::Intronic,
            _ => GeneRegion::Utr,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            GeneRegion::Intergenic => 0,
            GeneRegion::Exonic => 1,
            GeneRegion::Intronic => 2,
            GeneRegion::Utr => 3,
        }
    }
}

/// Canonical per-variant record produced by every parser.
///
/// Built once per parse call and consumed by classification; the
/// [`FeatureVector`](crate::features::FeatureVector) conversion is the only
/// path from a record to model input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    /// 1-22 autosomes, 23 = X, 24 = Y, 25 = MT, 0 = unrecognized
    pub chromosome: u8,
    /// 1-based coordinate as given by the source, 0 when unknown
    pub position: u64,
    pub ref_length: usize,
    pub alt_length: usize,
    pub quality_score: f64,
    pub variant_type: VariantType,
    pub gc_content: f64,
    pub is_transition: bool,
    pub is_transversion: bool,
    pub indel_length: usize,
    pub conservation_score: f64,
    pub gene_region: GeneRegion,
    pub depth: f64,
    pub allele_frequency: f64,
    pub mapping_quality: f64,
    /// Human readable description, e.g. `17:41197694:A>T`
    pub original_variant: String,
    pub known_pathogenic: bool,
    pub gene_name: String,
    pub known_condition: String,
    /// Catalog pathogenicity, 0 when the variant is not catalogued
    pub known_pathogenicity: f64,
}

/// Input formats recognised by the format detector
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FileFormat {
    VCF,
    FASTA,
    RawDna,
    Unknown,
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::VCF => "VCF",
            FileFormat::FASTA => "FASTA",
            FileFormat::RawDna => "RAW_DNA",
            FileFormat::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Catalogued pathogenic variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownVariant {
    pub gene: String,
    pub condition: String,
    pub pathogenicity: f64,
}

/// Inclusive genomic span of a gene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneLocus {
    pub gene: String,
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
}

impl GeneLocus {
    pub fn contains(&self, chromosome: u8, position: u64) -> bool {
        crate::features::encode_chromosome(&self.chromosome) == chromosome
            && self.start <= position
            && position <= self.end
    }
}

/// Sequence motif associated with a pathogenic allele
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathogenicMotif {
    pub motif: String,
    pub gene: String,
    pub condition: String,
    pub pathogenicity: f64,
}

/// Disease category predicted by the multi-class model.
///
/// Declaration order is the model's class index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DiseaseCategory {
    HereditaryCancerSyndrome,
    NeurologicalDisorder,
    CardiovascularDisease,
    MetabolicDisorder,
    GeneticSyndrome,
    PulmonaryDisease,
    ConnectiveTissueDisorder,
    BenignVariant,
}

impl DiseaseCategory {
    pub const ALL: [DiseaseCategory; 8] = [
        DiseaseCategory::HereditaryCancerSyndrome,
        DiseaseCategory::NeurologicalDisorder,
        DiseaseCategory::CardiovascularDisease,
        DiseaseCategory::MetabolicDisorder,
        DiseaseCategory::GeneticSyndrome,
        DiseaseCategory::PulmonaryDisease,
        DiseaseCategory::ConnectiveTissueDisorder,
        DiseaseCategory::BenignVariant,
    ];

    pub fn from_class(class: usize) -> Option<Self> {
        Self::ALL.get(class).copied()
    }

    pub fn condition_name(self) -> &'static str {
        match self {
            DiseaseCategory::HereditaryCancerSyndrome => "Hereditary Cancer Syndrome",
            DiseaseCategory::NeurologicalDisorder => "Neurological Disorder",
            DiseaseCategory::CardiovascularDisease => "Cardiovascular Disease",
            DiseaseCategory::MetabolicDisorder => "Metabolic Disorder",
            DiseaseCategory::GeneticSyndrome => "Genetic Syndrome",
            DiseaseCategory::PulmonaryDisease => "Pulmonary Disease",
            DiseaseCategory::ConnectiveTissueDisorder => "Connective Tissue Disorder",
            DiseaseCategory::BenignVariant => "Benign Variant",
        }
    }
}

/// Risk tier derived from pathogenic probability
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => f.write_str("low"),
            RiskLevel::Medium => f.write_str("medium"),
            RiskLevel::High => f.write_str("high"),
        }
    }
}

/// Classification outcome for a single variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub variant: String,
    /// Decimal chromosome code
    pub chromosome: String,
    pub position: u64,
    pub gene: String,
    pub pathogenic_probability: f64,
    pub disease_condition: String,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub conservation_score: f64,
    pub gene_region: GeneRegion,
    pub is_known_pathogenic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 1, VariantType::Snv)]
    #[case(1, 3, VariantType::Insertion)]
    #[case(0, 1, VariantType::Insertion)]
    #[case(4, 1, VariantType::Deletion)]
    #[case(2, 2, VariantType::Complex)]
    #[case(0, 0, VariantType::Complex)]
    fn test_variant_type_rule(
        #[case] ref_length: usize,
        #[case] alt_length: usize,
        #[case] expected: VariantType,
    ) {
        assert_eq!(VariantType::classify(ref_length, alt_length), expected);
    }

    #[test]
    fn test_gene_region_codes_round_trip() {
        for code in 0..4u8 {
            assert_eq!(GeneRegion::from_code(code as u64).code(), code);
        }
    }

    #[test]
    fn test_disease_category_mapping() {
        assert_eq!(
            DiseaseCategory::from_class(0).map(|c| c.condition_name()),
            Some("Hereditary Cancer Syndrome")
        );
        assert_eq!(
            DiseaseCategory::from_class(7).map(|c| c.condition_name()),
            Some("Benign Variant")
        );
        assert_eq!(DiseaseCategory::from_class(8), None);
    }

    #[test]
    fn test_gene_locus_contains_is_inclusive() {
        let locus = GeneLocus {
            gene: "F9".to_string(),
            chromosome: "X".to_string(),
            start: 100,
            end: 200,
        };
        assert!(locus.contains(23, 100));
        assert!(locus.contains(23, 200));
        assert!(!locus.contains(23, 201));
        assert!(!locus.contains(1, 150));
    }
}

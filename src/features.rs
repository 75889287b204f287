//! Derived numeric features shared by every parser.
//!
//! The conservation and gene-region functions here are placeholder heuristics,
//! not biological annotations: they hash coordinates or sequence composition
//! into plausible-looking values so the classifier has stable inputs.

use crate::types::{GeneRegion, VariantRecord};

/// Number of model input dimensions
pub const FEATURE_COUNT: usize = 15;

/// Feature names in model input order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "chromosome",
    "position",
    "ref_length",
    "alt_length",
    "quality_score",
    "indel_length",
    "gc_content",
    "conservation_score",
    "variant_type",
    "is_transition",
    "is_transversion",
    "gene_region",
    "depth",
    "allele_frequency",
    "mapping_quality",
];

/// Chromosomes whose variants are over-represented among training positives
pub const DISEASE_CHROMOSOMES: [u8; 4] = [17, 13, 1, 19];

/// Typed model input.
///
/// Field order matches [`FEATURE_NAMES`] and [`FeatureVector::to_array`] is the
/// only flattening used, by both training-set synthesis and inference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub chromosome: f64,
    pub position: f64,
    pub ref_length: f64,
    pub alt_length: f64,
    pub quality_score: f64,
    pub indel_length: f64,
    pub gc_content: f64,
    pub conservation_score: f64,
    pub variant_type: f64,
    pub is_transition: f64,
    pub is_transversion: f64,
    pub gene_region: f64,
    pub depth: f64,
    pub allele_frequency: f64,
    pub mapping_quality: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.chromosome,
            self.position,
            self.ref_length,
            self.alt_length,
            self.quality_score,
            self.indel_length,
            self.gc_content,
            self.conservation_score,
            self.variant_type,
            self.is_transition,
            self.is_transversion,
            self.gene_region,
            self.depth,
            self.allele_frequency,
            self.mapping_quality,
        ]
    }
}

impl From<&VariantRecord> for FeatureVector {
    fn from(record: &VariantRecord) -> Self {
        Self {
            chromosome: record.chromosome as f64,
            position: record.position as f64,
            ref_length: record.ref_length as f64,
            alt_length: record.alt_length as f64,
            quality_score: record.quality_score,
            indel_length: record.indel_length as f64,
            gc_content: record.gc_content,
            conservation_score: record.conservation_score,
            variant_type: record.variant_type.code() as f64,
            is_transition: bool_feature(record.is_transition),
            is_transversion: bool_feature(record.is_transversion),
            gene_region: record.gene_region.code() as f64,
            depth: record.depth,
            allele_frequency: record.allele_frequency,
            mapping_quality: record.mapping_quality,
        }
    }
}

fn bool_feature(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// Map a chromosome label to its numeric code.
///
/// A leading `chr` is ignored. `1`..`25` map to themselves, `X` to 23, `Y` to
/// 24, `MT`/`M` to 25; every other label is 0.
pub fn encode_chromosome(label: &str) -> u8 {
    let trimmed = label.trim();
    let stripped = match trimmed.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") => &trimmed[3..],
        _ => trimmed,
    };
    let upper = stripped.to_ascii_uppercase();

    if !upper.is_empty() && upper.bytes().all(|b| b.is_ascii_digit()) {
        return match upper.parse::<u8>() {
            Ok(code) if (1..=25).contains(&code) => code,
            _ => 0,
        };
    }

    match upper.as_str() {
        "X" => 23,
        "Y" => 24,
        "MT" | "M" => 25,
        _ => 0,
    }
}

/// Fraction of G/C bases; 0 for an empty sequence
pub fn gc_content(sequence: &str) -> f64 {
    if sequence.is_empty() {
        return 0.0;
    }
    let gc = sequence
        .bytes()
        .filter(|b| matches!(b, b'G' | b'C' | b'g' | b'c'))
        .count();
    gc as f64 / sequence.len() as f64
}

fn single_base(allele: &str) -> Option<u8> {
    match allele.as_bytes() {
        [base] => Some(base.to_ascii_uppercase()),
        _ => None,
    }
}

/// Purine-purine or pyrimidine-pyrimidine single-base substitution
pub fn is_transition(reference: &str, alternate: &str) -> bool {
    match (single_base(reference), single_base(alternate)) {
        (Some(r), Some(a)) => matches!(
            (r, a),
            (b'A', b'G') | (b'G', b'A') | (b'C', b'T') | (b'T', b'C')
        ),
        _ => false,
    }
}

/// Single-base substitution that changes the base but is not a transition
pub fn is_transversion(reference: &str, alternate: &str) -> bool {
    match (single_base(reference), single_base(alternate)) {
        (Some(r), Some(a)) => r != a && !is_transition(reference, alternate),
        _ => false,
    }
}

/// Coordinate-hash conservation heuristic for tabular variants.
///
/// Base value by chromosome group plus `(position mod 1000) / 1000 * 0.3`,
/// capped at 1.0.
pub fn locus_conservation(chromosome: u8, position: u64) -> f64 {
    let base = match chromosome {
        1..=3 => 0.7,
        21 | 22 => 0.6,
        23 => 0.8,
        _ => 0.65,
    };
    let position_factor = (position % 1000) as f64 / 1000.0 * 0.3;
    (base + position_factor).min(1.0)
}

/// Coordinate-hash region heuristic: `(chromosome * position) mod 4`
pub fn locus_region(chromosome: u8, position: u64) -> GeneRegion {
    GeneRegion::from_code((chromosome as u64 % 4) * (position % 4))
}

/// Composition-based conservation heuristic for bare sequences.
///
/// GC-rich sequences (> 0.6) score `min(2 * gc, 1)`, otherwise `gc`. Each base
/// making up more than 40% of the sequence subtracts 0.2. The result is
/// clamped to [0.3, 1.0].
pub fn sequence_conservation(sequence: &str) -> f64 {
    let gc = gc_content(sequence);
    let cpg_score = if gc > 0.6 { (gc * 2.0).min(1.0) } else { gc };

    let len = sequence.len();
    let repeat_penalty: f64 = if len == 0 {
        0.0
    } else {
        [b'A', b'T', b'C', b'G']
            .iter()
            .filter(|&&base| {
                let count = sequence.bytes().filter(|&b| b == base).count();
                count as f64 / len as f64 > 0.4
            })
            .count() as f64
            * 0.2
    };

    (cpg_score - repeat_penalty).max(0.3).min(1.0)
}

/// GC-threshold region heuristic for bare sequences
pub fn sequence_region(gc_content: f64) -> GeneRegion {
    if gc_content > 0.55 {
        GeneRegion::Exonic
    } else if gc_content > 0.45 {
        GeneRegion::Intronic
    } else if gc_content > 0.35 {
        GeneRegion::Utr
    } else {
        GeneRegion::Intergenic
    }
}

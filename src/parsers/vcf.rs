use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::features::{
    encode_chromosome, gc_content, is_transition, is_transversion, locus_conservation,
    locus_region,
};
use crate::parsers::VariantParser;
use crate::registry::{GeneRegionRegistry, KnownVariantRegistry};
use crate::types::*;

/// Quality assigned when the QUAL column is missing or not a plain number
pub const DEFAULT_QUALITY: f64 = 30.0;

lazy_static! {
    static ref DEPTH_RE: Regex = Regex::new(r"DP=(\d+)").expect("valid DP pattern");
    static ref ALLELE_FREQUENCY_RE: Regex = Regex::new(r"AF=([\d.]+)").expect("valid AF pattern");
    static ref MAPPING_QUALITY_RE: Regex = Regex::new(r"MQ=([\d.]+)").expect("valid MQ pattern");
}

/// Numeric annotations pulled from the INFO column
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InfoFeatures {
    pub depth: f64,
    pub allele_frequency: f64,
    pub mapping_quality: f64,
}

/// VCF parser for tab-delimited variant call text
pub struct VcfParser<'a> {
    known: &'a KnownVariantRegistry,
    genes: &'a GeneRegionRegistry,
}

impl VcfParser<'static> {
    pub fn new() -> Self {
        Self::with_registries(KnownVariantRegistry::builtin(), GeneRegionRegistry::builtin())
    }
}

impl Default for VcfParser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> VcfParser<'a> {
    pub fn with_registries(known: &'a KnownVariantRegistry, genes: &'a GeneRegionRegistry) -> Self {
        Self { known, genes }
    }

    pub fn parse(&self, content: &str) -> Vec<VariantRecord> {
        content
            .trim()
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.starts_with('#') && !line.trim().is_empty())
            .filter_map(|(index, line)| {
                let variant = self.parse_variant_line(line);
                if variant.is_none() {
                    debug!(line = index + 1, "Skipping VCF line with fewer than 5 columns");
                }
                variant
            })
            .collect()
    }

    /// Parse one data line; `None` when it has fewer than five columns
    pub fn parse_variant_line(&self, line: &str) -> Option<VariantRecord> {
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 5 {
            return None;
        }

        let chromosome_label = parts[0];
        let chromosome = encode_chromosome(chromosome_label);
        let position = parse_position(parts[1]);
        let reference = parts[3];
        let alternate = parts[4];
        let quality_score = parse_quality(parts.get(5).copied());
        let info = parse_info_field(parts.get(7).copied().unwrap_or(""));

        let ref_length = reference.len();
        let alt_length = alternate.len();

        let (known_pathogenic, gene_name, known_condition, known_pathogenicity) =
            match self.known.get(chromosome, position) {
                Some(known) => (
                    true,
                    known.gene.clone(),
                    known.condition.clone(),
                    known.pathogenicity,
                ),
                None => (
                    false,
                    self.genes.gene_name(chromosome, position).to_string(),
                    "Unknown".to_string(),
                    0.0,
                ),
            };

        Some(VariantRecord {
            chromosome,
            position,
            ref_length,
            alt_length,
            quality_score,
            variant_type: VariantType::classify(ref_length, alt_length),
            gc_content: gc_content(&format!("{}{}", reference, alternate)),
            is_transition: is_transition(reference, alternate),
            is_transversion: is_transversion(reference, alternate),
            indel_length: ref_length.abs_diff(alt_length),
            conservation_score: locus_conservation(chromosome, position),
            gene_region: locus_region(chromosome, position),
            depth: info.depth,
            allele_frequency: info.allele_frequency,
            mapping_quality: info.mapping_quality,
            original_variant: format!(
                "{}:{}:{}>{}",
                chromosome_label, position, reference, alternate
            ),
            known_pathogenic,
            gene_name,
            known_condition,
            known_pathogenicity,
        })
    }
}

impl VariantParser for VcfParser<'_> {
    fn parse(&self, content: &str) -> Vec<VariantRecord> {
        VcfParser::parse(self, content)
    }
}

/// Digits-only positions parse, anything else is 0
fn parse_position(field: &str) -> u64 {
    if !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit()) {
        field.parse().unwrap_or(0)
    } else {
        0
    }
}

/// Plain unsigned decimals parse, `.`/missing/other text falls back to 30
fn parse_quality(field: Option<&str>) -> f64 {
    match field {
        Some(value)
            if value.bytes().any(|b| b.is_ascii_digit())
                && value.bytes().all(|b| b.is_ascii_digit() || b == b'.') =>
        {
            value.parse().unwrap_or(DEFAULT_QUALITY)
        }
        _ => DEFAULT_QUALITY,
    }
}

/// Extract DP, AF and MQ from an INFO string; absent keys are 0
pub fn parse_info_field(info: &str) -> InfoFeatures {
    let mut features = InfoFeatures::default();
    if info.is_empty() || info == "." {
        return features;
    }

    features.depth = capture_number(&DEPTH_RE, info);
    features.allele_frequency = capture_number(&ALLELE_FREQUENCY_RE, info);
    features.mapping_quality = capture_number(&MAPPING_QUALITY_RE, info);
    features
}

fn capture_number(re: &Regex, info: &str) -> f64 {
    re.captures(info)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

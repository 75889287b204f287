use bio::pattern_matching::bom::BOM;
use lazy_static::lazy_static;
use regex::Regex;

use crate::features::{encode_chromosome, gc_content};
use crate::parsers::{RawSequenceAnalyzer, VariantParser};
use crate::registry::{GeneRegionRegistry, MotifCatalog};
use crate::types::*;

lazy_static! {
    static ref HEADER_CHROMOSOME_RE: Regex =
        Regex::new(r"(?i)\bchr(?:omosome)?[\s_:-]*([0-9]{1,2}|MT|X|Y|M)\b")
            .expect("valid chromosome pattern");
}

/// One `>`-delimited record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub header: String,
    pub sequence: String,
}

/// Split marker-delimited text into records.
///
/// Sequence lines are trimmed and upper-cased. Lines before the first marker
/// form a record with an empty header; records without sequence are dropped.
pub fn split_records(content: &str) -> Vec<SequenceRecord> {
    let mut records = Vec::new();
    let mut header = String::new();
    let mut sequence = String::new();

    for line in content.lines() {
        let line = line.trim();
        if let Some(next_header) = line.strip_prefix('>') {
            if !sequence.is_empty() {
                records.push(SequenceRecord {
                    header: std::mem::take(&mut header),
                    sequence: std::mem::take(&mut sequence),
                });
            }
            header = next_header.to_string();
            sequence.clear();
        } else {
            sequence.push_str(&line.to_ascii_uppercase());
        }
    }

    if !sequence.is_empty() {
        records.push(SequenceRecord { header, sequence });
    }

    records
}

/// FASTA-like parser that screens each record against the pathogenic motif
/// catalog
pub struct FastaParser<'a> {
    motifs: &'a MotifCatalog,
    genes: &'a GeneRegionRegistry,
    raw: RawSequenceAnalyzer,
}

impl FastaParser<'static> {
    pub fn new() -> Self {
        Self::with_registries(MotifCatalog::builtin(), GeneRegionRegistry::builtin())
    }
}

impl Default for FastaParser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FastaParser<'a> {
    pub fn with_registries(motifs: &'a MotifCatalog, genes: &'a GeneRegionRegistry) -> Self {
        Self {
            motifs,
            genes,
            raw: RawSequenceAnalyzer::new(),
        }
    }

    pub fn parse(&self, content: &str) -> Vec<VariantRecord> {
        split_records(content)
            .iter()
            .flat_map(|record| self.analyze_record(record))
            .collect()
    }

    /// One variant per catalogued motif found in the record, or a single
    /// raw-sequence variant when nothing matches
    pub fn analyze_record(&self, record: &SequenceRecord) -> Vec<VariantRecord> {
        let variants: Vec<VariantRecord> = self
            .motifs
            .iter()
            .filter_map(|motif| {
                let matcher = BOM::new(motif.motif.as_bytes());
                let position = matcher.find_all(record.sequence.as_bytes()).next()?;
                Some(self.motif_variant(motif, position, &record.header))
            })
            .collect();

        if variants.is_empty() {
            self.raw.analyze(&record.sequence).into_iter().collect()
        } else {
            variants
        }
    }

    fn motif_variant(&self, motif: &PathogenicMotif, position: usize, header: &str) -> VariantRecord {
        let length = motif.motif.len();
        let prefix: String = motif.motif.chars().take(10).collect();

        VariantRecord {
            chromosome: self.infer_chromosome(header, &motif.gene),
            position: position as u64,
            ref_length: length,
            alt_length: length,
            quality_score: 60.0,
            variant_type: VariantType::Snv,
            gc_content: gc_content(&motif.motif),
            is_transition: false,
            is_transversion: false,
            indel_length: 0,
            conservation_score: 0.95,
            gene_region: GeneRegion::Exonic,
            depth: 100.0,
            allele_frequency: 0.5,
            mapping_quality: 60.0,
            original_variant: format!("{}:{}...", motif.gene, prefix),
            known_pathogenic: true,
            gene_name: motif.gene.clone(),
            known_condition: motif.condition.clone(),
            known_pathogenicity: motif.pathogenicity,
        }
    }

    /// `chr<label>` in the header wins, then the gene's declared chromosome
    fn infer_chromosome(&self, header: &str, gene: &str) -> u8 {
        HEADER_CHROMOSOME_RE
            .captures(header)
            .and_then(|caps| caps.get(1))
            .map(|label| encode_chromosome(label.as_str()))
            .filter(|&code| code != 0)
            .or_else(|| {
                self.genes
                    .locus(gene)
                    .map(|locus| encode_chromosome(&locus.chromosome))
            })
            .unwrap_or(0)
    }
}

impl VariantParser for FastaParser<'_> {
    fn parse(&self, content: &str) -> Vec<VariantRecord> {
        FastaParser::parse(self, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CFTR_MOTIF: &str = "GAAAATATCATCTTTGGTGTTTCC";

    #[test]
    fn test_split_records() {
        let records = split_records("ACGT\n>one\nacg\nTTA\n>empty\n>two desc\nGG\n");
        assert_eq!(
            records,
            vec![
                SequenceRecord {
                    header: String::new(),
                    sequence: "ACGT".to_string(),
                },
                SequenceRecord {
                    header: "one".to_string(),
                    sequence: "ACGTTA".to_string(),
                },
                SequenceRecord {
                    header: "two desc".to_string(),
                    sequence: "GG".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_single_motif_emits_one_known_variant() {
        let content = format!(">sample\nTTTTTTTTTT{}AAAAAAAAAA\n", CFTR_MOTIF.to_lowercase());
        let variants = FastaParser::new().parse(&content);

        assert_eq!(variants.len(), 1);
        let variant = &variants[0];
        assert!(variant.known_pathogenic);
        assert_eq!(variant.gene_name, "CFTR");
        assert_eq!(variant.known_condition, "Cystic Fibrosis");
        assert_eq!(variant.known_pathogenicity, 0.98);
        assert_eq!(variant.position, 10);
        assert_eq!(variant.chromosome, 7);
        assert_eq!(variant.gene_region, GeneRegion::Exonic);
        assert_eq!(variant.conservation_score, 0.95);
        assert_eq!(variant.original_variant, "CFTR:GAAAATATCA...");
    }

    #[test]
    fn test_header_chromosome_overrides_gene_default() {
        let content = format!(">patient chr12 region\n{}\n", CFTR_MOTIF);
        let variants = FastaParser::new().parse(&content);
        assert_eq!(variants[0].chromosome, 12);
    }

    #[test]
    fn test_repeated_motif_reports_first_occurrence() {
        let content = format!(">r\nAA{}CC{}\n", CFTR_MOTIF, CFTR_MOTIF);
        let variants = FastaParser::new().parse(&content);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].position, 2);
    }

    #[test]
    fn test_record_without_motif_falls_back_to_raw() {
        let variants = FastaParser::new().parse(">plain\nATATATATGC\n>cftr\nGAAAATATCATCTTTGGTGTTTCC\n");
        assert_eq!(variants.len(), 2);
        assert!(!variants[0].known_pathogenic);
        assert_eq!(variants[0].original_variant, "raw_sequence_10bp");
        assert!(variants[1].known_pathogenic);
    }
}

use tracing::{info, warn};

use crate::registry::{GeneRegionRegistry, KnownVariantRegistry, MotifCatalog};
use crate::types::{FileFormat, VariantRecord};

pub mod fasta;
pub mod raw;
pub mod vcf;

pub use fasta::{FastaParser, SequenceRecord};
pub use raw::RawSequenceAnalyzer;
pub use vcf::VcfParser;

/// Common interface for the per-format parsers.
///
/// Parsing never fails: malformed input is skipped or replaced by defaults.
pub trait VariantParser {
    fn parse(&self, content: &str) -> Vec<VariantRecord>;
}

/// Variants extracted from one input payload
#[derive(Debug, Clone)]
pub struct ParsedVariants {
    pub format: FileFormat,
    pub variants: Vec<VariantRecord>,
}

/// Classify raw text by format.
///
/// Priority: VCF, then FASTA-like records, then bare nucleotides. Anything else
/// is [`FileFormat::Unknown`].
pub fn detect_format(content: &str) -> FileFormat {
    let content = content.trim();

    if looks_like_vcf(content) {
        FileFormat::VCF
    } else if looks_like_fasta(content) {
        FileFormat::FASTA
    } else if content
        .chars()
        .all(|c| matches!(c.to_ascii_uppercase(), 'A' | 'T' | 'C' | 'G' | 'N' | ' ' | '\n' | '\t' | '\r'))
    {
        FileFormat::RawDna
    } else {
        FileFormat::Unknown
    }
}

fn looks_like_vcf(content: &str) -> bool {
    if content.starts_with("#CHROM") || content.starts_with("##fileformat") {
        return true;
    }

    content.contains('\t')
        && content
            .lines()
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .any(|line| is_chromosome_label(line.split('\t').next().unwrap_or_default()))
}

fn looks_like_fasta(content: &str) -> bool {
    content.starts_with('>')
        || (content.contains('>')
            && content.chars().all(|c| {
                matches!(
                    c.to_ascii_uppercase(),
                    'A' | 'T' | 'C' | 'G' | 'N' | '\n' | '\r' | '>'
                )
            }))
}

/// Numeric chromosome or one of X, Y, MT, M, with an optional `chr` prefix
fn is_chromosome_label(field: &str) -> bool {
    let label = strip_chr_prefix(field.trim());
    (!label.is_empty() && label.bytes().all(|b| b.is_ascii_digit()))
        || ["X", "Y", "MT", "M"]
            .iter()
            .any(|known| label.eq_ignore_ascii_case(known))
}

pub(crate) fn strip_chr_prefix(label: &str) -> &str {
    match label.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") => &label[3..],
        _ => label,
    }
}

/// Detects the input format and dispatches to the matching parser
pub struct FileParser<'a> {
    vcf: VcfParser<'a>,
    fasta: FastaParser<'a>,
    raw: RawSequenceAnalyzer,
}

impl FileParser<'static> {
    /// Parser backed by the built-in registries
    pub fn new() -> Self {
        Self::with_registries(
            KnownVariantRegistry::builtin(),
            GeneRegionRegistry::builtin(),
            MotifCatalog::builtin(),
        )
    }
}

impl Default for FileParser<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FileParser<'a> {
    pub fn with_registries(
        known: &'a KnownVariantRegistry,
        genes: &'a GeneRegionRegistry,
        motifs: &'a MotifCatalog,
    ) -> Self {
        Self {
            vcf: VcfParser::with_registries(known, genes),
            fasta: FastaParser::with_registries(motifs, genes),
            raw: RawSequenceAnalyzer::new(),
        }
    }

    /// Detect the format of `content` and extract every variant record
    pub fn parse(&self, content: &str) -> ParsedVariants {
        let format = detect_format(content);
        info!("Detected file format: {}", format);

        let variants = match format {
            FileFormat::VCF => self.vcf.parse(content),
            FileFormat::FASTA => self.fasta.parse(content),
            FileFormat::RawDna => self.raw.parse(content),
            FileFormat::Unknown => {
                warn!("Unknown file format, treating input as a raw DNA sequence");
                self.raw.parse(content)
            }
        };

        ParsedVariants { format, variants }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#CHROM\tPOS\tID\tREF\tALT\n", FileFormat::VCF)]
    #[case("##fileformat=VCFv4.2\n", FileFormat::VCF)]
    #[case("17\t41197694\t.\tA\tT\t50\tPASS\t.", FileFormat::VCF)]
    #[case("chrX\t100\t.\tA\tG", FileFormat::VCF)]
    #[case("MT\t100\t.\tA\tG", FileFormat::VCF)]
    #[case(">seq1\nATCG\n", FileFormat::FASTA)]
    #[case("ATCG\n>\nGGCC", FileFormat::FASTA)]
    #[case("ATCG\n>seq2\nGGCC", FileFormat::Unknown)]
    #[case("ATCG ATCG\nNNNN", FileFormat::RawDna)]
    #[case("atcg", FileFormat::RawDna)]
    #[case("", FileFormat::RawDna)]
    #[case("hello world", FileFormat::Unknown)]
    #[case("foo\tbar", FileFormat::Unknown)]
    fn test_detect_format(#[case] content: &str, #[case] expected: FileFormat) {
        assert_eq!(detect_format(content), expected);
    }

    #[test]
    fn test_unknown_format_falls_back_to_raw_analysis() {
        let parsed = FileParser::new().parse("hello world");
        assert_eq!(parsed.format, FileFormat::Unknown);
        assert_eq!(parsed.variants.len(), 1);
        assert!(!parsed.variants[0].known_pathogenic);
    }

    #[test]
    fn test_empty_input_yields_no_variants() {
        let parsed = FileParser::new().parse("");
        assert!(parsed.variants.is_empty());
        let parsed = FileParser::new().parse("  \n\t ");
        assert!(parsed.variants.is_empty());
    }
}

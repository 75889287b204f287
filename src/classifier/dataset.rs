use ndarray::Array2;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Normal};

use crate::error::ModelError;
use crate::features::{FeatureVector, DISEASE_CHROMOSOMES, FEATURE_COUNT};
use crate::types::{GeneRegion, VariantType};

/// Weighted sum above which a synthetic variant is labelled pathogenic
pub const PATHOGENIC_SCORE_THRESHOLD: f64 = 0.6;

/// Disease label of every benign synthetic variant
pub const BENIGN_CLASS: usize = 4;

const ALLELE_LENGTH_WEIGHTS: [f64; 4] = [0.70, 0.15, 0.10, 0.05];

/// Synthetic labelled feature matrix
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub features: Array2<f64>,
    pub pathogenic: Vec<usize>,
    pub disease: Vec<usize>,
}

/// Row indices of a shuffled train/held-out partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl TrainingSet {
    /// Draw `n_samples` synthetic variants from a seeded generator
    pub fn synthesize(n_samples: usize, seed: u64) -> Result<Self, ModelError> {
        if n_samples == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }

        let allele_length = WeightedIndex::new(ALLELE_LENGTH_WEIGHTS).map_err(distribution_error)?;
        let quality = Normal::new(30.0, 10.0).map_err(distribution_error)?;
        let gc = Beta::new(2.0, 2.0).map_err(distribution_error)?;
        let conservation = Beta::new(3.0, 2.0).map_err(distribution_error)?;
        let depth = Normal::new(50.0, 20.0).map_err(distribution_error)?;
        let allele_frequency = Beta::new(1.0, 10.0).map_err(distribution_error)?;
        let mapping_quality = Normal::new(40.0, 10.0).map_err(distribution_error)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut values = Vec::with_capacity(n_samples * FEATURE_COUNT);
        let mut pathogenic = Vec::with_capacity(n_samples);
        let mut disease = Vec::with_capacity(n_samples);

        for _ in 0..n_samples {
            let ref_length = (allele_length.sample(&mut rng) + 1) as f64;
            let alt_length = (allele_length.sample(&mut rng) + 1) as f64;

            let vector = FeatureVector {
                chromosome: rng.gen_range(1..25) as f64,
                position: rng.gen_range(1000..250_000_000u64) as f64,
                ref_length,
                alt_length,
                quality_score: quality.sample(&mut rng),
                indel_length: (alt_length - ref_length).abs(),
                gc_content: gc.sample(&mut rng),
                conservation_score: conservation.sample(&mut rng),
                variant_type: rng.gen_range(0..4) as f64,
                is_transition: rng.gen_range(0..2) as f64,
                is_transversion: rng.gen_range(0..2) as f64,
                gene_region: rng.gen_range(0..4) as f64,
                depth: depth.sample(&mut rng),
                allele_frequency: allele_frequency.sample(&mut rng),
                mapping_quality: mapping_quality.sample(&mut rng),
            };

            let label = pathogenic_label(&vector);
            pathogenic.push(label);
            disease.push(disease_label(&vector, label == 1));
            values.extend_from_slice(&vector.to_array());
        }

        let features = Array2::from_shape_vec((n_samples, FEATURE_COUNT), values)?;
        Ok(Self {
            features,
            pathogenic,
            disease,
        })
    }

    pub fn len(&self) -> usize {
        self.pathogenic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pathogenic.is_empty()
    }

    /// Shuffle row indices and hold out `test_fraction` of them.
    /// Both sides keep at least one row when there are two or more.
    pub fn split(&self, test_fraction: f64, seed: u64) -> Split {
        let n = self.len();
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(seed));

        let n_test = ((n as f64 * test_fraction).round() as usize).clamp(1, n.saturating_sub(1).max(1));
        let train = indices.split_off(n_test.min(n));
        Split {
            train,
            test: indices,
        }
    }
}

/// 1 when the weighted pathogenicity score exceeds the threshold
pub fn pathogenic_label(vector: &FeatureVector) -> usize {
    let exonic = vector.gene_region == GeneRegion::Exonic.code() as f64;
    let disease_chromosome = DISEASE_CHROMOSOMES
        .iter()
        .any(|&chromosome| vector.chromosome == chromosome as f64);
    let indel = vector.variant_type == VariantType::Insertion.code() as f64
        || vector.variant_type == VariantType::Deletion.code() as f64;

    let score = vector.conservation_score * 0.4
        + indicator(exonic) * 0.3
        + indicator(disease_chromosome) * 0.2
        + indicator(indel) * 0.1;

    usize::from(score > PATHOGENIC_SCORE_THRESHOLD)
}

/// Disease class: 0 cancer-like, 1 neurological-like, 2 metabolic-like,
/// 3 other pathogenic, 4 benign
pub fn disease_label(vector: &FeatureVector, pathogenic: bool) -> usize {
    if !pathogenic {
        return BENIGN_CLASS;
    }

    if vector.chromosome == 17.0 && vector.conservation_score > 0.8 {
        0
    } else if vector.chromosome == 19.0 {
        1
    } else if vector.chromosome == 22.0 {
        2
    } else {
        3
    }
}

fn distribution_error(err: impl std::fmt::Display) -> ModelError {
    ModelError::Distribution(err.to_string())
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vector(chromosome: f64, conservation: f64, region: GeneRegion, vtype: VariantType) -> FeatureVector {
        FeatureVector {
            chromosome,
            position: 1000.0,
            ref_length: 1.0,
            alt_length: 1.0,
            quality_score: 30.0,
            indel_length: 0.0,
            gc_content: 0.5,
            conservation_score: conservation,
            variant_type: vtype.code() as f64,
            is_transition: 0.0,
            is_transversion: 0.0,
            gene_region: region.code() as f64,
            depth: 50.0,
            allele_frequency: 0.1,
            mapping_quality: 40.0,
        }
    }

    #[test]
    fn test_pathogenic_label_rule() {
        // 0.9 * 0.4 + 0.3 = 0.66
        assert_eq!(
            pathogenic_label(&vector(5.0, 0.9, GeneRegion::Exonic, VariantType::Snv)),
            1
        );
        // 0.9 * 0.4 + 0.2 = 0.56
        assert_eq!(
            pathogenic_label(&vector(17.0, 0.9, GeneRegion::Intronic, VariantType::Snv)),
            0
        );
        // 0.5 * 0.4 + 0.3 + 0.2 = 0.70
        assert_eq!(
            pathogenic_label(&vector(13.0, 0.5, GeneRegion::Exonic, VariantType::Snv)),
            1
        );
        // 0.25 * 0.4 + 0.3 + 0.1 = 0.50
        assert_eq!(
            pathogenic_label(&vector(2.0, 0.25, GeneRegion::Exonic, VariantType::Deletion)),
            0
        );
    }

    #[test]
    fn test_disease_label_rule() {
        let snv = VariantType::Snv;
        let exonic = GeneRegion::Exonic;
        assert_eq!(disease_label(&vector(17.0, 0.85, exonic, snv), true), 0);
        assert_eq!(disease_label(&vector(17.0, 0.75, exonic, snv), true), 3);
        assert_eq!(disease_label(&vector(19.0, 0.5, exonic, snv), true), 1);
        assert_eq!(disease_label(&vector(22.0, 0.5, exonic, snv), true), 2);
        assert_eq!(disease_label(&vector(1.0, 0.9, exonic, snv), true), 3);
        assert_eq!(disease_label(&vector(17.0, 0.95, exonic, snv), false), BENIGN_CLASS);
    }

    #[test]
    fn test_synthesis_is_seeded() {
        let first = TrainingSet::synthesize(200, 7).expect("valid distributions");
        let second = TrainingSet::synthesize(200, 7).expect("valid distributions");
        let other = TrainingSet::synthesize(200, 8).expect("valid distributions");

        assert_eq!(first.features, second.features);
        assert_eq!(first.pathogenic, second.pathogenic);
        assert_ne!(first.features, other.features);
    }

    #[test]
    fn test_synthetic_ranges() {
        let set = TrainingSet::synthesize(500, 42).expect("valid distributions");
        assert_eq!(set.features.dim(), (500, FEATURE_COUNT));

        for row in set.features.rows() {
            assert!((1.0..=24.0).contains(&row[0]));
            assert!((1000.0..250_000_000.0).contains(&row[1]));
            assert!((1.0..=4.0).contains(&row[2]));
            assert_eq!(row[5], (row[3] - row[2]).abs());
            assert!((0.0..=1.0).contains(&row[6]));
            assert!((0.0..=3.0).contains(&row[8]));
            assert!((0.0..=3.0).contains(&row[11]));
        }
        for (&pathogenic, &disease) in set.pathogenic.iter().zip(&set.disease) {
            assert_eq!(pathogenic == 0, disease == BENIGN_CLASS);
        }
        assert!(set.pathogenic.iter().any(|&label| label == 1));
        assert!(set.pathogenic.iter().any(|&label| label == 0));
    }

    #[test]
    fn test_split_partitions_rows() {
        let set = TrainingSet::synthesize(100, 1).expect("valid distributions");
        let split = set.split(0.2, 1);
        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.len(), 80);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
        assert_eq!(split, set.split(0.2, 1));
    }

    #[test]
    fn test_zero_samples_is_an_error() {
        assert!(matches!(
            TrainingSet::synthesize(0, 42),
            Err(ModelError::EmptyTrainingSet)
        ));
    }
}

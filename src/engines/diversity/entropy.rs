/// Information-theoretic dispersion measures over a population.
///
/// All functions are pure; randomness (pair sampling) comes from the caller.
use crate::engines::genome::{Genome, Param};
use crate::types::{LineageVector, StrategyTraits};
use rand::Rng;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const GENE_BINS: usize = 10;
pub const STRATEGY_BINS: usize = 10;

/// Upper bounds used to normalize the composite score
pub const MAX_GENE_ENTROPY: f64 = 3.32; // log2(10)
pub const MAX_STRATEGY_ENTROPY: f64 = 6.64; // log2(100)
pub const MAX_LINEAGE_ENTROPY: f64 = 5.64; // log2(50)
pub const FAMILY_SATURATION: f64 = 50.0;

/// Shannon entropy (base 2) of a histogram or unnormalized distribution
pub fn shannon_entropy<I: IntoIterator<Item = f64>>(weights: I) -> f64 {
    let weights: Vec<f64> = weights
        .into_iter()
        .filter(|w| w.is_finite() && *w > 0.0)
        .collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    let mut entropy = 0.0;
    for w in weights {
        let p = w / total;
        if p > 0.0 {
            entropy -= p * p.log2();
        }
    }
    entropy
}

/// Fixed-width bin of `value` over `[lo, hi]`; values outside are clamped
pub fn bin_index(value: f64, lo: f64, hi: f64, bins: usize) -> usize {
    let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    ((t * bins as f64) as usize).min(bins - 1)
}

/// Mean per-parameter entropy of 10-bin value histograms, over every
/// parameter active in at least one genome
pub fn gene_entropy(genomes: &[&Genome]) -> f64 {
    let per_dimension: Vec<Option<f64>> = Param::ALL
        .par_iter()
        .map(|&param| {
            let mut histogram = [0.0f64; GENE_BINS];
            let mut seen = false;
            for genome in genomes {
                if let Some(v) = genome.value(param) {
                    if v.is_finite() {
                        histogram[bin_index(v, 0.0, 1.0, GENE_BINS)] += 1.0;
                        seen = true;
                    }
                }
            }
            seen.then(|| shannon_entropy(histogram))
        })
        .collect();

    let present: Vec<f64> = per_dimension.into_iter().flatten().collect();
    if present.is_empty() {
        0.0
    } else {
        present.iter().sum::<f64>() / present.len() as f64
    }
}

/// 1 - sum of squared family shares, grouping members by dominant family
pub fn simpson_index(families: &[&str]) -> f64 {
    if families.is_empty() {
        return 0.0;
    }
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for family in families {
        *counts.entry(*family).or_insert(0) += 1;
    }
    let n = families.len() as f64;
    1.0 - counts
        .values()
        .map(|&c| {
            let share = c as f64 / n;
            share * share
        })
        .sum::<f64>()
}

/// Mean Euclidean genome distance: every pair when the population is at most
/// `exhaustive_limit`, otherwise `sample_pairs` random distinct pairs
pub fn average_gene_distance<R: Rng + ?Sized>(
    genomes: &[&Genome],
    exhaustive_limit: usize,
    sample_pairs: usize,
    rng: &mut R,
) -> f64 {
    let n = genomes.len();
    if n < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut pairs = 0usize;

    if n <= exhaustive_limit || sample_pairs == 0 {
        for i in 0..n {
            for j in (i + 1)..n {
                total += genomes[i].distance(genomes[j]);
                pairs += 1;
            }
        }
    } else {
        for _ in 0..sample_pairs {
            let i = rng.gen_range(0..n);
            let mut j = rng.gen_range(0..n - 1);
            if j >= i {
                j += 1;
            }
            total += genomes[i].distance(genomes[j]);
            pairs += 1;
        }
    }

    total / pairs as f64
}

/// Entropy of a 10x10 histogram over the two strategy traits
pub fn strategy_entropy(
    traits: &[StrategyTraits],
    aggression_range: (f64, f64),
    horizon_range: (f64, f64),
) -> f64 {
    let mut histogram = [0.0f64; STRATEGY_BINS * STRATEGY_BINS];
    for t in traits {
        if !t.aggression.is_finite() || !t.horizon.is_finite() {
            continue;
        }
        let x = bin_index(t.aggression, aggression_range.0, aggression_range.1, STRATEGY_BINS);
        let y = bin_index(t.horizon, horizon_range.0, horizon_range.1, STRATEGY_BINS);
        histogram[x * STRATEGY_BINS + y] += 1.0;
    }
    shannon_entropy(histogram)
}

/// Distinct trait pairs at 0.1 resolution
pub fn unique_strategy_count(traits: &[StrategyTraits]) -> usize {
    traits
        .iter()
        .filter(|t| t.aggression.is_finite() && t.horizon.is_finite())
        .map(|t| ((t.aggression * 10.0).round() as i64, (t.horizon * 10.0).round() as i64))
        .collect::<HashSet<_>>()
        .len()
}

/// Element-wise mean of every member's lineage vector
pub fn average_lineage(lineages: &[&LineageVector]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    if lineages.is_empty() {
        return totals;
    }
    for lineage in lineages {
        for (family, weight) in lineage.iter() {
            if weight.is_finite() {
                *totals.entry(family.to_string()).or_insert(0.0) += weight;
            }
        }
    }
    let n = lineages.len() as f64;
    for weight in totals.values_mut() {
        *weight /= n;
    }
    totals
}

pub fn lineage_entropy(lineages: &[&LineageVector]) -> f64 {
    shannon_entropy(average_lineage(lineages).into_values())
}

/// Families whose summed lineage weight exceeds `max(1, 0.01 * population)`
pub fn active_family_count(lineages: &[&LineageVector]) -> usize {
    let threshold = (0.01 * lineages.len() as f64).max(1.0);
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for lineage in lineages {
        for (family, weight) in lineage.iter() {
            if weight.is_finite() {
                *totals.entry(family).or_insert(0.0) += weight;
            }
        }
    }
    totals.values().filter(|&&total| total > threshold).count()
}

/// Weighted composite in [0, 1]
pub fn composite_score(
    gene_entropy: f64,
    strategy_entropy: f64,
    lineage_entropy: f64,
    active_families: usize,
) -> f64 {
    let score = 0.30 * (gene_entropy / MAX_GENE_ENTROPY).min(1.0)
        + 0.30 * (strategy_entropy / MAX_STRATEGY_ENTROPY).min(1.0)
        + 0.20 * (lineage_entropy / MAX_LINEAGE_ENTROPY).min(1.0)
        + 0.20 * (active_families as f64 / FAMILY_SATURATION).min(1.0);
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_histogram_entropy() {
        assert!((shannon_entropy([1.0; 10]) - 10f64.log2()).abs() < 1e-12);
        assert_eq!(shannon_entropy([5.0, 0.0, 0.0]), 0.0);
        assert_eq!(shannon_entropy(Vec::<f64>::new()), 0.0);
        assert!((shannon_entropy([1.0, 1.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bin_edges() {
        assert_eq!(bin_index(0.0, 0.0, 1.0, 10), 0);
        assert_eq!(bin_index(0.099, 0.0, 1.0, 10), 0);
        assert_eq!(bin_index(0.1, 0.0, 1.0, 10), 1);
        assert_eq!(bin_index(1.0, 0.0, 1.0, 10), 9);
        assert_eq!(bin_index(-3.0, 0.0, 1.0, 10), 0);
        assert_eq!(bin_index(25.0, 0.0, 50.0, 10), 5);
    }

    #[test]
    fn test_simpson_index() {
        assert_eq!(simpson_index(&["a", "a", "a"]), 0.0);
        assert!((simpson_index(&["a", "b"]) - 0.5).abs() < 1e-12);
        assert!((simpson_index(&["a", "b", "c", "d"]) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_unique_strategy_rounding() {
        let traits = vec![
            StrategyTraits::new(0.31, 0.52),
            StrategyTraits::new(0.29, 0.48),
            StrategyTraits::new(0.9, 0.1),
        ];
        assert_eq!(unique_strategy_count(&traits), 2);
    }

    #[test]
    fn test_active_family_threshold() {
        let solo_a = LineageVector::single("a");
        let solo_b = LineageVector::single("b");
        let mixed = LineageVector::from_weights(vec![("a", 0.5), ("c", 0.5)]);
        let lineages = vec![&solo_a, &solo_a, &solo_b, &mixed];

        // a = 2.5, b = 1.0 (not above 1.0), c = 0.5
        assert_eq!(active_family_count(&lineages), 1);
        let avg = average_lineage(&lineages);
        assert!((avg["a"] - 0.625).abs() < 1e-12);
    }

    #[test]
    fn test_composite_bounds() {
        assert_eq!(composite_score(0.0, 0.0, 0.0, 0), 0.0);
        assert!((composite_score(10.0, 10.0, 10.0, 500) - 1.0).abs() < 1e-12);
    }
}

/// Descending order of `scores` as indices into the input.
///
/// The sort is stable, so equal scores keep their input order. NaN ranks last.
pub fn rank_by_score(scores: &[f64]) -> Vec<usize> {
    let keyed: Vec<f64> = scores
        .iter()
        .map(|&s| if s.is_nan() { f64::NEG_INFINITY } else { s })
        .collect();

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| keyed[b].total_cmp(&keyed[a]));
    order
}

/// Split of a ranked population for one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Top `elite_ratio` positions, protected from elimination
    pub elite: Vec<usize>,
    /// Bottom `elimination_ratio` positions
    pub eliminate: Vec<usize>,
    /// Everything not eliminated, best first; contains every elite
    pub survivors: Vec<usize>,
}

/// Number of members a ratio selects from a population of `n`
pub fn ratio_count(n: usize, ratio: f64) -> usize {
    if !ratio.is_finite() || ratio <= 0.0 {
        return 0;
    }
    // Nudge so 10 * 0.3 lands on 3 despite float representation
    (((n as f64) * ratio.min(1.0)) + 1e-9).floor() as usize
}

/// Partition a ranking (best first) into elite, eliminated and surviving
/// positions. Eliminations never reach into the elite.
pub fn partition(ranking: &[usize], elite_ratio: f64, elimination_ratio: f64) -> Partition {
    let n = ranking.len();
    let elite_count = ratio_count(n, elite_ratio);
    let eliminate_count = ratio_count(n, elimination_ratio).min(n - elite_count);

    let cut = n - eliminate_count;
    Partition {
        elite: ranking[..elite_count].to_vec(),
        eliminate: ranking[cut..].to_vec(),
        survivors: ranking[..cut].to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_descending_with_stable_ties() {
        let scores = [1.0, 5.0, 3.0, 5.0, f64::NAN, -2.0];
        assert_eq!(rank_by_score(&scores), vec![1, 3, 2, 0, 5, 4]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank_by_score(&[]).is_empty());
    }

    #[test]
    fn test_partition_scenario() {
        let ranking: Vec<usize> = (0..10).collect();
        let split = partition(&ranking, 0.2, 0.3);

        assert_eq!(split.elite, vec![0, 1]);
        assert_eq!(split.eliminate, vec![7, 8, 9]);
        assert_eq!(split.survivors.len(), 7);
        assert!(split.elite.iter().all(|e| split.survivors.contains(e)));
    }

    #[test]
    fn test_elite_never_eliminated() {
        for n in 0..40 {
            let ranking: Vec<usize> = (0..n).rev().collect();
            let split = partition(&ranking, 0.6, 0.6);
            for e in &split.elite {
                assert!(!split.eliminate.contains(e));
            }
            assert_eq!(split.survivors.len() + split.eliminate.len(), n);
        }
    }

    #[test]
    fn test_ratio_count_floors() {
        assert_eq!(ratio_count(10, 0.3), 3);
        assert_eq!(ratio_count(7, 0.3), 2);
        assert_eq!(ratio_count(100, 0.29), 29);
        assert_eq!(ratio_count(5, 0.0), 0);
        assert_eq!(ratio_count(5, f64::NAN), 0);
    }
}

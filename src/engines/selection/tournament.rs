use crate::types::AgentId;
use rand::seq::index;
use rand::Rng;

/// Tournament selection: sample `tournament_size` distinct candidates and keep
/// the highest scoring one. The first sampled wins ties.
pub fn tournament_selection<R: Rng + ?Sized>(
    candidates: &[(AgentId, f64)],
    tournament_size: usize,
    rng: &mut R,
) -> Option<AgentId> {
    if candidates.is_empty() {
        return None;
    }

    let k = tournament_size.clamp(1, candidates.len());
    let mut best: Option<(AgentId, f64)> = None;

    for idx in index::sample(rng, candidates.len(), k).iter() {
        let (id, score) = candidates[idx];
        let score = if score.is_nan() { f64::NEG_INFINITY } else { score };
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((id, score)),
        }
    }

    best.map(|(id, _)| id)
}

/// Two parents chosen for one breeding slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentSelection {
    pub first: AgentId,
    pub second: AgentId,
    /// Both parents are the same member
    pub self_cross: bool,
}

/// Run two tournaments, retrying the second up to `retry_limit` times until it
/// differs from the first. When the retries keep landing on the first parent,
/// the second is drawn from the remaining candidates. Only a single-member pool
/// self-crosses.
pub fn select_parents<R: Rng + ?Sized>(
    candidates: &[(AgentId, f64)],
    tournament_size: usize,
    retry_limit: usize,
    rng: &mut R,
) -> Option<ParentSelection> {
    let first = tournament_selection(candidates, tournament_size, rng)?;

    // A tournament covering the whole pool always returns the same winner
    if tournament_size < candidates.len() {
        for _ in 0..=retry_limit {
            let second = tournament_selection(candidates, tournament_size, rng)?;
            if second != first {
                return Some(ParentSelection {
                    first,
                    second,
                    self_cross: false,
                });
            }
        }
    }

    let rest: Vec<(AgentId, f64)> = candidates
        .iter()
        .copied()
        .filter(|(id, _)| *id != first)
        .collect();
    match tournament_selection(&rest, tournament_size, rng) {
        Some(second) => Some(ParentSelection {
            first,
            second,
            self_cross: false,
        }),
        None => Some(ParentSelection {
            first,
            second: first,
            self_cross: true,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool(scores: &[f64]) -> Vec<(AgentId, f64)> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &s)| (AgentId(i as u64), s))
            .collect()
    }

    #[test]
    fn test_full_tournament_picks_best() {
        let mut rng = StdRng::seed_from_u64(42);
        let candidates = pool(&[1.0, 9.0, 4.0]);
        for _ in 0..50 {
            assert_eq!(tournament_selection(&candidates, 3, &mut rng), Some(AgentId(1)));
        }
    }

    #[test]
    fn test_worst_never_wins_size_two_tournament() {
        let mut rng = StdRng::seed_from_u64(8);
        let candidates = pool(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        for _ in 0..200 {
            assert_ne!(tournament_selection(&candidates, 2, &mut rng), Some(AgentId(0)));
        }
    }

    #[test]
    fn test_empty_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(tournament_selection(&[], 3, &mut rng), None);
        assert_eq!(select_parents(&[], 3, 10, &mut rng), None);
    }

    #[test]
    fn test_single_survivor_self_crosses() {
        let mut rng = StdRng::seed_from_u64(1);
        let selection = select_parents(&pool(&[2.0]), 3, 10, &mut rng).unwrap();
        assert!(selection.self_cross);
        assert_eq!(selection.first, selection.second);
    }

    #[test]
    fn test_parents_distinct_when_possible() {
        let mut rng = StdRng::seed_from_u64(99);
        let candidates = pool(&[5.0, 4.0, 3.0, 2.0, 1.0, 0.0]);
        for _ in 0..50 {
            let selection = select_parents(&candidates, 2, 10, &mut rng).unwrap();
            assert!(!selection.self_cross);
            assert_ne!(selection.first, selection.second);
        }
    }

    #[test]
    fn test_small_pools_never_self_cross() {
        let mut rng = StdRng::seed_from_u64(31);
        for n in [2usize, 3] {
            let scores: Vec<f64> = (0..n).map(|i| i as f64).collect();
            let candidates = pool(&scores);
            for _ in 0..200 {
                let selection = select_parents(&candidates, 3, 10, &mut rng).unwrap();
                assert!(!selection.self_cross, "self-cross with {} candidates", n);
                assert_ne!(selection.first, selection.second);
                // The full-pool tournament always crowns the best
                assert_eq!(selection.first, AgentId(n as u64 - 1));
            }
        }
    }

    #[test]
    fn test_second_parent_is_runner_up_in_pair() {
        let mut rng = StdRng::seed_from_u64(32);
        let candidates = pool(&[7.0, 1.0]);
        let selection = select_parents(&candidates, 3, 0, &mut rng).unwrap();
        assert_eq!(selection.first, AgentId(0));
        assert_eq!(selection.second, AgentId(1));
    }
}

use crate::types::PerformanceStats;
use serde::{Deserialize, Serialize};

/// Weights turning harness performance stats into a single ranking score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub pnl_weight: f64,
    pub win_rate_weight: f64,    // applied to (win_rate - 0.5)
    pub trade_count_weight: f64, // applied to ln(1 + trades)
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            pnl_weight: 1.0,
            win_rate_weight: 100.0,
            trade_count_weight: 0.0,
        }
    }
}

impl FitnessWeights {
    pub fn score(&self, stats: &PerformanceStats) -> f64 {
        let mut fitness = 0.0;

        if stats.total_pnl.is_finite() {
            fitness += self.pnl_weight * stats.total_pnl;
        }
        fitness += self.win_rate_weight * (stats.win_rate - 0.5);
        fitness += self.trade_count_weight * (1.0 + stats.trade_count as f64).ln();

        fitness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_score_orders_by_pnl_then_win_rate() {
        let weights = FitnessWeights::default();
        let winner = PerformanceStats::from_counts(500.0, 10, 7);
        let loser = PerformanceStats::from_counts(-300.0, 10, 3);
        let flat_good = PerformanceStats::from_counts(0.0, 10, 8);
        let flat_bad = PerformanceStats::from_counts(0.0, 10, 2);

        assert!(weights.score(&winner) > weights.score(&loser));
        assert!(weights.score(&flat_good) > weights.score(&flat_bad));
        assert!((weights.score(&winner) - 520.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_pnl_is_ignored() {
        let weights = FitnessWeights::default();
        let stats = PerformanceStats::new(f64::NAN, 0.5, 3);
        assert_eq!(weights.score(&stats), 0.0);
    }
}

use super::traits::{check_unit_interval, ConfigSection};
use crate::error::EvolutionError;
use serde::{Deserialize, Serialize};

/// Minimums a population must meet to count as healthy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    pub min_gene_entropy: f64,
    pub min_strategy_entropy: f64,
    pub min_lineage_entropy: f64,
    pub min_active_families: usize,
    pub min_diversity_score: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            min_gene_entropy: 2.0,
            min_strategy_entropy: 1.5,
            min_lineage_entropy: 2.5,
            min_active_families: 10,
            min_diversity_score: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversityConfig {
    pub thresholds: HealthThresholds,
    /// Below this share of a threshold an alert is critical rather than a warning
    pub critical_fraction: f64,
    /// Relative score drop that raises a decline alert
    pub decline_fraction: f64,
    pub decline_lookback: usize,
    pub history_window: usize,
    pub alert_history_window: usize,
    /// Populations up to this size get exhaustive pairwise distances
    pub exhaustive_distance_limit: usize,
    pub distance_sample_pairs: usize,
    pub aggression_range: (f64, f64),
    pub horizon_range: (f64, f64),
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            thresholds: HealthThresholds::default(),
            critical_fraction: 0.70,
            decline_fraction: 0.20,
            decline_lookback: 3,
            history_window: 100,
            alert_history_window: 100,
            exhaustive_distance_limit: 20,
            distance_sample_pairs: 100,
            aggression_range: (0.0, 1.0),
            horizon_range: (0.0, 1.0),
        }
    }
}

impl ConfigSection for DiversityConfig {
    fn section_name() -> &'static str {
        "diversity"
    }

    fn validate(&self) -> Result<(), EvolutionError> {
        let section = Self::section_name();
        check_unit_interval(section, "critical_fraction", self.critical_fraction)?;
        check_unit_interval(section, "decline_fraction", self.decline_fraction)?;

        for (name, (lo, hi)) in [
            ("aggression_range", self.aggression_range),
            ("horizon_range", self.horizon_range),
        ] {
            if !lo.is_finite() || !hi.is_finite() || hi <= lo {
                return Err(EvolutionError::Configuration(format!(
                    "{}.{} must be an increasing finite range, got ({}, {})",
                    section, name, lo, hi
                )));
            }
        }
        if self.history_window == 0 {
            return Err(EvolutionError::Configuration(
                "Diversity history window must hold at least one snapshot".to_string()
            ));
        }
        Ok(())
    }
}

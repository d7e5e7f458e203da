use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable diversity snapshot for one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityMetrics {
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
    pub gene_entropy: f64,
    pub simpson_index: f64,
    pub avg_gene_distance: f64,
    pub strategy_entropy: f64,
    pub unique_strategy_count: usize,
    pub lineage_entropy: f64,
    pub active_family_count: usize,
    pub diversity_score: f64,
    pub is_healthy: bool,
}

impl DiversityMetrics {
    /// Zeroed, unhealthy snapshot used for empty populations
    pub fn empty(cycle: u64) -> Self {
        Self {
            cycle,
            timestamp: Utc::now(),
            gene_entropy: 0.0,
            simpson_index: 0.0,
            avg_gene_distance: 0.0,
            strategy_entropy: 0.0,
            unique_strategy_count: 0,
            lineage_entropy: 0.0,
            active_family_count: 0,
            diversity_score: 0.0,
            is_healthy: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertMetric {
    GeneEntropy,
    StrategyEntropy,
    LineageEntropy,
    ActiveFamilies,
    DiversityScore,
}

impl fmt::Display for AlertMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlertMetric::GeneEntropy => "gene entropy",
            AlertMetric::StrategyEntropy => "strategy entropy",
            AlertMetric::LineageEntropy => "lineage entropy",
            AlertMetric::ActiveFamilies => "active families",
            AlertMetric::DiversityScore => "diversity score",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// At or above 70% of the threshold
    Warning,
    /// Below 70% of the threshold
    Critical,
    /// Score fell sharply against an earlier cycle
    Decline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityAlert {
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
    pub metric: AlertMetric,
    pub severity: AlertSeverity,
    pub value: f64,
    /// Health threshold, or the earlier score for decline alerts
    pub threshold: f64,
    pub message: String,
}

/// Result of one measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityReport {
    pub metrics: DiversityMetrics,
    pub alerts: Vec<DiversityAlert>,
}

impl DiversityReport {
    pub fn has_critical(&self) -> bool {
        self.alerts.iter().any(|a| a.severity == AlertSeverity::Critical)
    }
}

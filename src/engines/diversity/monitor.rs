/// Population diversity monitor
///
/// Measures gene, strategy and lineage dispersion once per cycle, derives a
/// composite score and a health verdict, raises alerts for failing checks and
/// for sharp score declines, and keeps bounded histories of both.
use super::entropy;
use super::metrics::{AlertMetric, AlertSeverity, DiversityAlert, DiversityMetrics, DiversityReport};
use crate::config::DiversityConfig;
use crate::engines::genome::Genome;
use crate::types::{LineageVector, StrategyTraits};
use crate::utils::history::BoundedHistory;
use chrono::Utc;
use log::{debug, warn};
use rand::Rng;

/// Read-only view of one member as the monitor sees it
#[derive(Debug, Clone, Copy)]
pub struct DiversitySample<'a> {
    pub genome: &'a Genome,
    pub traits: StrategyTraits,
    pub lineage: &'a LineageVector,
    pub family: &'a str,
}

pub struct DiversityMonitor {
    config: DiversityConfig,
    metrics_history: BoundedHistory<DiversityMetrics>,
    alert_history: BoundedHistory<DiversityAlert>,
}

impl DiversityMonitor {
    pub fn new(config: DiversityConfig) -> Self {
        let metrics_history = BoundedHistory::new(config.history_window);
        let alert_history = BoundedHistory::new(config.alert_history_window);
        Self {
            config,
            metrics_history,
            alert_history,
        }
    }

    pub fn config(&self) -> &DiversityConfig {
        &self.config
    }

    /// Measure a population snapshot and record the result
    pub fn measure<R: Rng + ?Sized>(
        &mut self,
        samples: &[DiversitySample<'_>],
        cycle: u64,
        rng: &mut R,
    ) -> DiversityReport {
        if samples.is_empty() {
            warn!("Diversity measurement on an empty population at cycle {}", cycle);
            let metrics = DiversityMetrics::empty(cycle);
            self.metrics_history.push(metrics.clone());
            return DiversityReport {
                metrics,
                alerts: Vec::new(),
            };
        }

        let metrics = self.compute(samples, cycle, rng);
        let alerts = self.evaluate_alerts(&metrics);

        for alert in &alerts {
            warn!("Diversity alert [{:?}] cycle {}: {}", alert.severity, alert.cycle, alert.message);
            self.alert_history.push(alert.clone());
        }
        self.metrics_history.push(metrics.clone());

        debug!(
            "Diversity cycle {}: score {:.3}, gene {:.2}, strategy {:.2}, lineage {:.2}, families {}",
            cycle,
            metrics.diversity_score,
            metrics.gene_entropy,
            metrics.strategy_entropy,
            metrics.lineage_entropy,
            metrics.active_family_count
        );

        DiversityReport { metrics, alerts }
    }

    fn compute<R: Rng + ?Sized>(
        &self,
        samples: &[DiversitySample<'_>],
        cycle: u64,
        rng: &mut R,
    ) -> DiversityMetrics {
        let genomes: Vec<&Genome> = samples.iter().map(|s| s.genome).collect();
        let traits: Vec<StrategyTraits> = samples.iter().map(|s| s.traits).collect();
        let lineages: Vec<&LineageVector> = samples.iter().map(|s| s.lineage).collect();
        let families: Vec<&str> = samples.iter().map(|s| s.family).collect();

        let gene_entropy = entropy::gene_entropy(&genomes);
        let simpson_index = entropy::simpson_index(&families);
        let avg_gene_distance = entropy::average_gene_distance(
            &genomes,
            self.config.exhaustive_distance_limit,
            self.config.distance_sample_pairs,
            rng,
        );
        let strategy_entropy = entropy::strategy_entropy(
            &traits,
            self.config.aggression_range,
            self.config.horizon_range,
        );
        let unique_strategy_count = entropy::unique_strategy_count(&traits);
        let lineage_entropy = entropy::lineage_entropy(&lineages);
        let active_family_count = entropy::active_family_count(&lineages);
        let diversity_score = entropy::composite_score(
            gene_entropy,
            strategy_entropy,
            lineage_entropy,
            active_family_count,
        );

        let mut metrics = DiversityMetrics {
            cycle,
            timestamp: Utc::now(),
            gene_entropy,
            simpson_index,
            avg_gene_distance,
            strategy_entropy,
            unique_strategy_count,
            lineage_entropy,
            active_family_count,
            diversity_score,
            is_healthy: false,
        };
        metrics.is_healthy = self.health_checks(&metrics).iter().all(|(_, value, threshold)| value >= threshold);
        metrics
    }

    fn health_checks(&self, metrics: &DiversityMetrics) -> [(AlertMetric, f64, f64); 5] {
        let t = &self.config.thresholds;
        [
            (AlertMetric::GeneEntropy, metrics.gene_entropy, t.min_gene_entropy),
            (AlertMetric::StrategyEntropy, metrics.strategy_entropy, t.min_strategy_entropy),
            (AlertMetric::LineageEntropy, metrics.lineage_entropy, t.min_lineage_entropy),
            (
                AlertMetric::ActiveFamilies,
                metrics.active_family_count as f64,
                t.min_active_families as f64,
            ),
            (AlertMetric::DiversityScore, metrics.diversity_score, t.min_diversity_score),
        ]
    }

    fn evaluate_alerts(&self, metrics: &DiversityMetrics) -> Vec<DiversityAlert> {
        let mut alerts = Vec::new();

        for (metric, value, threshold) in self.health_checks(metrics) {
            if value >= threshold {
                continue;
            }
            let severity = if value >= threshold * self.config.critical_fraction {
                AlertSeverity::Warning
            } else {
                AlertSeverity::Critical
            };
            alerts.push(DiversityAlert {
                cycle: metrics.cycle,
                timestamp: metrics.timestamp,
                metric,
                severity,
                value,
                threshold,
                message: format!("{} {:.3} below threshold {:.3}", metric, value, threshold),
            });
        }

        if let Some(decline) = self.decline_alert(metrics) {
            alerts.push(decline);
        }

        alerts
    }

    /// Compare against the score `decline_lookback` cycles earlier
    fn decline_alert(&self, metrics: &DiversityMetrics) -> Option<DiversityAlert> {
        let lookback = self.config.decline_lookback;
        if lookback == 0 {
            return None;
        }
        let earlier = self.metrics_history.nth_back(lookback - 1)?;
        if earlier.diversity_score <= 0.0 {
            return None;
        }

        let drop = (earlier.diversity_score - metrics.diversity_score) / earlier.diversity_score;
        if drop <= self.config.decline_fraction {
            return None;
        }

        Some(DiversityAlert {
            cycle: metrics.cycle,
            timestamp: metrics.timestamp,
            metric: AlertMetric::DiversityScore,
            severity: AlertSeverity::Decline,
            value: metrics.diversity_score,
            threshold: earlier.diversity_score,
            message: format!(
                "diversity score fell {:.1}% since cycle {} ({:.3} -> {:.3})",
                drop * 100.0,
                earlier.cycle,
                earlier.diversity_score,
                metrics.diversity_score
            ),
        })
    }

    pub fn latest(&self) -> Option<&DiversityMetrics> {
        self.metrics_history.latest()
    }

    pub fn history(&self) -> &BoundedHistory<DiversityMetrics> {
        &self.metrics_history
    }

    pub fn alerts(&self) -> &BoundedHistory<DiversityAlert> {
        &self.alert_history
    }

    /// Score change between the newest snapshot and the one `window` cycles before
    pub fn score_trend(&self, window: usize) -> Option<f64> {
        let newest = self.metrics_history.latest()?;
        let earlier = self.metrics_history.nth_back(window)?;
        Some(newest.diversity_score - earlier.diversity_score)
    }

    /// Drop all recorded history
    pub fn reset(&mut self) {
        self.metrics_history.clear();
        self.alert_history.clear();
    }
}

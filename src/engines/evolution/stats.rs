use serde::{Deserialize, Serialize};

/// Per-cycle record appended to the generation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u64,
    pub cycle: u64,
    pub population_size: usize,
    pub elite_count: usize,
    pub eliminated_count: usize,
    pub new_agent_count: usize,
    pub min_param_count: usize,
    pub mean_param_count: f64,
    pub max_param_count: usize,
    // Performance (total pnl) of the population as ranked this cycle
    pub min_performance: f64,
    pub mean_performance: f64,
    pub max_performance: f64,
    pub profitable_fraction: f64,
    pub diversity_score: f64,
}

/// (min, mean, max) of the finite values, zeros when there are none
pub fn min_mean_max<I: IntoIterator<Item = f64>>(values: I) -> (f64, f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut count = 0usize;

    for v in values.into_iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
        sum += v;
        count += 1;
    }

    if count == 0 {
        (0.0, 0.0, 0.0)
    } else {
        (min, sum / count as f64, max)
    }
}

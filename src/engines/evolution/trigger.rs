use super::population::Population;
use crate::config::TriggerConfig;
use serde::{Deserialize, Serialize};

/// Why the host should run an evolution cycle now
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EvolutionTrigger {
    /// Mean trades per member reached the mode minimum
    TradeThreshold { avg_trades: f64 },
    /// Too many cycles passed without evolution
    FallbackInterval { cycles_since_last: u64 },
    /// Almost nobody is profitable
    Crisis { profitable_fraction: f64 },
}

/// Check the three independent triggers in priority order
pub fn evaluate(
    config: &TriggerConfig,
    population: &Population,
    cycles_since_last: u64,
) -> Option<EvolutionTrigger> {
    if population.is_empty() {
        return None;
    }

    let avg_trades = population.average_trade_count();
    if avg_trades >= config.min_avg_trades() {
        return Some(EvolutionTrigger::TradeThreshold { avg_trades });
    }

    if cycles_since_last >= config.fallback_interval {
        return Some(EvolutionTrigger::FallbackInterval { cycles_since_last });
    }

    if cycles_since_last >= config.emergency_min_interval {
        let profitable_fraction = population.profitable_fraction();
        if profitable_fraction < config.crisis_profitable_fraction {
            return Some(EvolutionTrigger::Crisis { profitable_fraction });
        }
    }

    None
}

use super::traits::{check_unit_interval, ConfigSection};
use crate::error::EvolutionError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Backtest,
    Live,
}

/// When the host should run an evolution cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub mode: RunMode,
    pub backtest_min_avg_trades: f64,
    pub live_min_avg_trades: f64,
    pub fallback_interval: u64,
    pub emergency_min_interval: u64,
    pub crisis_profitable_fraction: f64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Backtest,
            backtest_min_avg_trades: 20.0,
            live_min_avg_trades: 5.0,
            fallback_interval: 50,
            emergency_min_interval: 10,
            crisis_profitable_fraction: 0.10,
        }
    }
}

impl TriggerConfig {
    pub fn min_avg_trades(&self) -> f64 {
        match self.mode {
            RunMode::Backtest => self.backtest_min_avg_trades,
            RunMode::Live => self.live_min_avg_trades,
        }
    }
}

impl ConfigSection for TriggerConfig {
    fn section_name() -> &'static str {
        "trigger"
    }

    fn validate(&self) -> Result<(), EvolutionError> {
        check_unit_interval(Self::section_name(), "crisis_profitable_fraction", self.crisis_profitable_fraction)?;
        if !self.backtest_min_avg_trades.is_finite() || !self.live_min_avg_trades.is_finite() {
            return Err(EvolutionError::Configuration(
                "Minimum average trade counts must be finite".to_string()
            ));
        }
        if self.fallback_interval == 0 {
            return Err(EvolutionError::Configuration(
                "Fallback interval must be at least 1 cycle".to_string()
            ));
        }
        Ok(())
    }
}

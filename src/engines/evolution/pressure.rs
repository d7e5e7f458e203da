use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureBand {
    Calm,     // p < 0.3, also used when no signal is available
    Moderate, // 0.3 <= p < 0.6
    High,     // 0.6 <= p < 0.8
    Extreme,  // p >= 0.8
    /// Adaptive pressure disabled; configured base rates apply
    Fixed,
}

/// Rates a cycle runs with, resolved from environmental pressure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureProfile {
    pub pressure: Option<f64>,
    pub band: PressureBand,
    pub elimination_rate: f64,
    pub mutation_rate: f64,
    pub forced_unlock: bool,
}

impl PressureProfile {
    pub const MAX_ELIMINATION_RATE: f64 = 0.30;

    /// Map a pressure reading in [0, 1] onto its band. Missing or non-finite
    /// readings fall into the calm band; finite readings are clamped.
    pub fn from_pressure(pressure: Option<f64>) -> Self {
        let pressure = pressure.filter(|p| p.is_finite()).map(|p| p.clamp(0.0, 1.0));
        let p = pressure.unwrap_or(0.0);

        let (band, elimination_rate, mutation_rate, forced_unlock) = if p < 0.3 {
            (PressureBand::Calm, 0.30, 0.15, false)
        } else if p < 0.6 {
            (PressureBand::Moderate, 0.25, 0.25, false)
        } else if p < 0.8 {
            (PressureBand::High, 0.20, 0.40, false)
        } else {
            (PressureBand::Extreme, 0.15, 0.60, true)
        };

        Self {
            pressure,
            band,
            elimination_rate,
            mutation_rate,
            forced_unlock,
        }
    }

    pub fn fixed(elimination_rate: f64, mutation_rate: f64) -> Self {
        Self {
            pressure: None,
            band: PressureBand::Fixed,
            elimination_rate,
            mutation_rate,
            forced_unlock: false,
        }
    }
}

/// Fixed parameter universe for trading-agent genomes
///
/// Every parameter is a real value in [0, 1]. The universe is partitioned into
/// ordered tiers; a tier's parameters become eligible for unlocking once a
/// genome reaches the tier's `unlock_generation`.
use crate::error::EvolutionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PARAM_COUNT: usize = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    // Core
    RiskAppetite,
    TrendPref,
    Patience,
    // Tactical
    StopLossTightness,
    TakeProfitRatio,
    PositionSizing,
    EntryThreshold,
    // Adaptive
    VolatilitySensitivity,
    MomentumWeight,
    MeanReversionBias,
    VolumeSensitivity,
    // Strategic
    ContrarianBias,
    NewsReactivity,
    TimeHorizon,
    HedgingTendency,
    // Exotic
    RegimeDetection,
    CorrelationAwareness,
    LiquidityPreference,
    DrawdownTolerance,
}

impl Param {
    pub const ALL: [Param; PARAM_COUNT] = [
        Param::RiskAppetite,
        Param::TrendPref,
        Param::Patience,
        Param::StopLossTightness,
        Param::TakeProfitRatio,
        Param::PositionSizing,
        Param::EntryThreshold,
        Param::VolatilitySensitivity,
        Param::MomentumWeight,
        Param::MeanReversionBias,
        Param::VolumeSensitivity,
        Param::ContrarianBias,
        Param::NewsReactivity,
        Param::TimeHorizon,
        Param::HedgingTendency,
        Param::RegimeDetection,
        Param::CorrelationAwareness,
        Param::LiquidityPreference,
        Param::DrawdownTolerance,
    ];

    /// Present in every genome, always
    pub const CORE: [Param; 3] = [Param::RiskAppetite, Param::TrendPref, Param::Patience];

    /// Dense array slot for this parameter
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Param::RiskAppetite => "risk_appetite",
            Param::TrendPref => "trend_pref",
            Param::Patience => "patience",
            Param::StopLossTightness => "stop_loss_tightness",
            Param::TakeProfitRatio => "take_profit_ratio",
            Param::PositionSizing => "position_sizing",
            Param::EntryThreshold => "entry_threshold",
            Param::VolatilitySensitivity => "volatility_sensitivity",
            Param::MomentumWeight => "momentum_weight",
            Param::MeanReversionBias => "mean_reversion_bias",
            Param::VolumeSensitivity => "volume_sensitivity",
            Param::ContrarianBias => "contrarian_bias",
            Param::NewsReactivity => "news_reactivity",
            Param::TimeHorizon => "time_horizon",
            Param::HedgingTendency => "hedging_tendency",
            Param::RegimeDetection => "regime_detection",
            Param::CorrelationAwareness => "correlation_awareness",
            Param::LiquidityPreference => "liquidity_preference",
            Param::DrawdownTolerance => "drawdown_tolerance",
        }
    }

    pub fn is_core(self) -> bool {
        Self::CORE.contains(&self)
    }

    pub fn tier(self) -> &'static Tier {
        TIERS
            .iter()
            .find(|t| t.params.contains(&self))
            .unwrap_or(&TIERS[0])
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Param {
    type Err = EvolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Param::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| EvolutionError::UnknownParameter(s.to_string()))
    }
}

/// A group of parameters unlocked together once a generation floor is met
#[derive(Debug)]
pub struct Tier {
    pub name: &'static str,
    pub unlock_generation: u32,
    pub unlock_probability: f64,
    pub params: &'static [Param],
}

pub static TIERS: [Tier; 5] = [
    Tier {
        name: "core",
        unlock_generation: 0,
        unlock_probability: 1.0,
        params: &[Param::RiskAppetite, Param::TrendPref, Param::Patience],
    },
    Tier {
        name: "tactical",
        unlock_generation: 3,
        unlock_probability: 0.50,
        params: &[
            Param::StopLossTightness,
            Param::TakeProfitRatio,
            Param::PositionSizing,
            Param::EntryThreshold,
        ],
    },
    Tier {
        name: "adaptive",
        unlock_generation: 8,
        unlock_probability: 0.30,
        params: &[
            Param::VolatilitySensitivity,
            Param::MomentumWeight,
            Param::MeanReversionBias,
            Param::VolumeSensitivity,
        ],
    },
    Tier {
        name: "strategic",
        unlock_generation: 15,
        unlock_probability: 0.15,
        params: &[
            Param::ContrarianBias,
            Param::NewsReactivity,
            Param::TimeHorizon,
            Param::HedgingTendency,
        ],
    },
    Tier {
        name: "exotic",
        unlock_generation: 25,
        unlock_probability: 0.05,
        params: &[
            Param::RegimeDetection,
            Param::CorrelationAwareness,
            Param::LiquidityPreference,
            Param::DrawdownTolerance,
        ],
    },
];

/// Pool for forced unlocks under extreme pressure, bypassing tier floors and odds
pub const RARE_PARAMS: [Param; 4] = [
    Param::RegimeDetection,
    Param::CorrelationAwareness,
    Param::LiquidityPreference,
    Param::DrawdownTolerance,
];

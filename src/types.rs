use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sequential identifier of a population member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl AgentId {
    /// Stand-in recorded when a crossover is performed without parent ids
    pub const UNKNOWN: AgentId = AgentId(u64::MAX);

    pub fn is_unknown(&self) -> bool {
        *self == Self::UNKNOWN
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "agent-unknown")
        } else {
            write!(f, "agent-{:05}", self.0)
        }
    }
}

/// Performance statistics supplied by the trading harness
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_pnl: f64,
    pub win_rate: f64, // 0-1
    pub trade_count: u32,
}

impl PerformanceStats {
    pub fn new(total_pnl: f64, win_rate: f64, trade_count: u32) -> Self {
        Self {
            total_pnl,
            win_rate: if win_rate.is_finite() { win_rate.clamp(0.0, 1.0) } else { 0.0 },
            trade_count,
        }
    }

    /// Build stats from raw win/trade counts
    pub fn from_counts(total_pnl: f64, trade_count: u32, wins: u32) -> Self {
        let win_rate = if trade_count == 0 {
            0.0
        } else {
            wins.min(trade_count) as f64 / trade_count as f64
        };
        Self::new(total_pnl, win_rate, trade_count)
    }

    pub fn is_profitable(&self) -> bool {
        self.total_pnl > 0.0
    }
}

/// Two scalar descriptors of how a member trades, used for strategy diversity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StrategyTraits {
    pub aggression: f64,
    pub horizon: f64,
}

impl StrategyTraits {
    pub fn new(aggression: f64, horizon: f64) -> Self {
        Self { aggression, horizon }
    }
}

/// Fractional family membership, weights summing to ~1
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineageVector(BTreeMap<String, f64>);

impl LineageVector {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Pure membership of a single family
    pub fn single(family: impl Into<String>) -> Self {
        let mut weights = BTreeMap::new();
        weights.insert(family.into(), 1.0);
        Self(weights)
    }

    pub fn from_weights<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (family, weight) in weights {
            if weight.is_finite() && weight > 0.0 {
                *map.entry(family.into()).or_insert(0.0) += weight;
            }
        }
        Self(map)
    }

    /// Weighted blend of two lineages; `weight_a` is the share of `a`
    pub fn blend(a: &LineageVector, b: &LineageVector, weight_a: f64) -> Self {
        let weight_a = weight_a.clamp(0.0, 1.0);
        let mut map: BTreeMap<String, f64> = BTreeMap::new();
        for (family, w) in &a.0 {
            *map.entry(family.clone()).or_insert(0.0) += w * weight_a;
        }
        for (family, w) in &b.0 {
            *map.entry(family.clone()).or_insert(0.0) += w * (1.0 - weight_a);
        }
        map.retain(|_, w| *w > 0.0);
        Self(map)
    }

    pub fn weight(&self, family: &str) -> f64 {
        self.0.get(family).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Family with the largest weight; ties resolve to the first name in order
    pub fn dominant_family(&self) -> Option<&str> {
        let mut best: Option<(&String, f64)> = None;
        for (family, &w) in &self.0 {
            match best {
                Some((_, best_w)) if w <= best_w => {}
                _ => best = Some((family, w)),
            }
        }
        best.map(|(family, _)| family.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything the evolution core reads about a member besides its genome.
/// The harness adapts its own agent type into this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessInput {
    pub stats: PerformanceStats,
    pub lineage: LineageVector,
    pub family: String,
    pub traits: StrategyTraits,
}

impl FitnessInput {
    pub fn new(lineage: LineageVector, traits: StrategyTraits) -> Self {
        let family = lineage.dominant_family().unwrap_or("unaffiliated").to_string();
        Self {
            stats: PerformanceStats::default(),
            lineage,
            family,
            traits,
        }
    }

    pub fn with_stats(mut self, stats: PerformanceStats) -> Self {
        self.stats = stats;
        self
    }
}

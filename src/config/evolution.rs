use super::traits::{check_unit_interval, ConfigSection};
use crate::engines::evolution::pressure::PressureProfile;
use crate::engines::selection::FitnessWeights;
use crate::error::EvolutionError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub elite_ratio: f64,
    pub elimination_ratio: f64,   // used when adaptive_pressure is off
    pub base_mutation_rate: f64,  // used when adaptive_pressure is off
    pub adaptive_pressure: bool,
    pub tournament_size: usize,
    pub parent_retry_limit: usize,
    pub breed_mutation_rate: f64,
    pub breed_mutation_strength: f64,
    pub forced_unlock_chance: f64,
    pub forced_unlock_param_cap: usize,
    pub immigration_interval: u64, // 0 disables immigration
    pub immigrants_per_wave: usize,
    pub seed: Option<u64>,
    pub fitness: FitnessWeights,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            elite_ratio: 0.10,
            elimination_ratio: 0.30,
            base_mutation_rate: 0.15,
            adaptive_pressure: true,
            tournament_size: 3,
            parent_retry_limit: 10,
            breed_mutation_rate: 0.5,
            breed_mutation_strength: 0.20,
            forced_unlock_chance: 0.30,
            forced_unlock_param_cap: 12,
            immigration_interval: 10,
            immigrants_per_wave: 3,
            seed: None,
            fitness: FitnessWeights::default(),
        }
    }
}

impl EvolutionConfig {
    /// Largest elimination ratio any cycle can apply under this config
    pub fn max_elimination_ratio(&self) -> f64 {
        if self.adaptive_pressure {
            self.elimination_ratio.max(PressureProfile::MAX_ELIMINATION_RATE)
        } else {
            self.elimination_ratio
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), EvolutionError> {
        let section = Self::section_name();
        check_unit_interval(section, "elite_ratio", self.elite_ratio)?;
        check_unit_interval(section, "elimination_ratio", self.elimination_ratio)?;
        check_unit_interval(section, "base_mutation_rate", self.base_mutation_rate)?;
        check_unit_interval(section, "breed_mutation_rate", self.breed_mutation_rate)?;
        check_unit_interval(section, "forced_unlock_chance", self.forced_unlock_chance)?;

        if self.elite_ratio + self.max_elimination_ratio() > 1.0 {
            return Err(EvolutionError::Configuration(format!(
                "elite_ratio ({}) + elimination_ratio ({}) must not exceed 1",
                self.elite_ratio,
                self.max_elimination_ratio()
            )));
        }
        if self.tournament_size == 0 {
            return Err(EvolutionError::Configuration(
                "Tournament size must be at least 1".to_string()
            ));
        }
        if !self.breed_mutation_strength.is_finite() || self.breed_mutation_strength < 0.0 {
            return Err(EvolutionError::Configuration(
                "Breed mutation strength must be a non-negative number".to_string()
            ));
        }
        Ok(())
    }
}

use super::breeding::{breed_child, BreedOutcome, BreedingPlan};
use super::hooks::PopulationHooks;
use super::population::{default_traits, Population, SpawnOrigin};
use super::pressure::PressureProfile;
use super::stats::{min_mean_max, GenerationStats};
use super::trigger::{self, EvolutionTrigger};
use crate::config::AppConfig;
use crate::engines::diversity::{DiversityMonitor, DiversityReport};
use crate::engines::selection::{partition, rank_by_score};
use crate::error::{EvolutionError, Result};
use crate::types::{AgentId, FitnessInput};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// External readings for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CycleInputs {
    pub cycle: u64,
    /// Environmental pressure in [0, 1]; `None` when no observer reading exists
    pub pressure: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub generation: u64,
    pub cycle: u64,
    pub profile: PressureProfile,
    pub elite: Vec<AgentId>,
    pub eliminated: Vec<AgentId>,
    pub bred: Vec<AgentId>,
    pub immigrants: Vec<AgentId>,
    /// Conditions recovered from during the cycle
    pub issues: Vec<EvolutionError>,
    pub diversity: DiversityReport,
    pub stats: GenerationStats,
}

impl CycleReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Some breeding slot was degraded or skipped
    pub fn is_degraded(&self) -> bool {
        !self.issues.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Nothing changed; the population was left as it was
    Skipped { cycle: u64, reason: EvolutionError },
}

impl CycleOutcome {
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            CycleOutcome::Completed(report) => Some(report),
            CycleOutcome::Skipped { .. } => None,
        }
    }
}

/// Runs evolution cycles over a live population.
///
/// All randomness comes from the owned `rng`, so two managers built with the
/// same seed replay identical cycles over identical populations.
pub struct EvolutionManager<R: Rng = StdRng> {
    config: AppConfig,
    monitor: DiversityMonitor,
    rng: R,
    generation: u64,
    history: Vec<GenerationStats>,
    last_evolution_cycle: Option<u64>,
}

impl EvolutionManager<StdRng> {
    /// Build from a validated config, seeding from `evolution.seed` when set
    pub fn new(config: AppConfig) -> Result<Self> {
        let rng = match config.evolution.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> EvolutionManager<R> {
    pub fn with_rng(config: AppConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let monitor = DiversityMonitor::new(config.diversity.clone());
        Ok(Self {
            config,
            monitor,
            rng,
            generation: 0,
            history: Vec::new(),
            last_evolution_cycle: None,
        })
    }

    /// Which trigger, if any, says a cycle is due at `current_cycle`
    pub fn should_run_evolution(&self, population: &Population, current_cycle: u64) -> Option<EvolutionTrigger> {
        let cycles_since_last = current_cycle.saturating_sub(self.last_evolution_cycle.unwrap_or(0));
        trigger::evaluate(&self.config.trigger, population, cycles_since_last)
    }

    /// Rates for this cycle. With adaptive pressure off the configured base
    /// rates apply regardless of the reading.
    pub fn resolve_profile(&self, pressure: Option<f64>) -> PressureProfile {
        let evolution = &self.config.evolution;
        if evolution.adaptive_pressure {
            PressureProfile::from_pressure(pressure)
        } else {
            PressureProfile::fixed(evolution.elimination_ratio, evolution.base_mutation_rate)
        }
    }

    /// Run one full cycle: rank, eliminate, breed replacements, immigrate,
    /// measure diversity and record stats.
    pub fn run_evolution_cycle<H: PopulationHooks + ?Sized>(
        &mut self,
        population: &mut Population,
        inputs: CycleInputs,
        hooks: &mut H,
    ) -> CycleOutcome {
        if population.is_empty() {
            warn!("Evolution cycle {} skipped: population is empty", inputs.cycle);
            return CycleOutcome::Skipped {
                cycle: inputs.cycle,
                reason: EvolutionError::EmptyPopulation,
            };
        }

        let generation = self.generation + 1;
        let profile = self.resolve_profile(inputs.pressure);
        let hints = hooks.unlock_hints();

        // Ranking
        let weights = &self.config.evolution.fitness;
        let scored: Vec<(AgentId, f64)> = population
            .members()
            .iter()
            .map(|m| (m.id(), weights.score(&m.fitness().stats)))
            .collect();
        let scores: Vec<f64> = scored.iter().map(|(_, s)| *s).collect();
        let (min_performance, mean_performance, max_performance) =
            min_mean_max(population.members().iter().map(|m| m.fitness().stats.total_pnl));
        let profitable_fraction = population.profitable_fraction();

        // Partitioning
        let ranking = rank_by_score(&scores);
        let split = partition(&ranking, self.config.evolution.elite_ratio, profile.elimination_rate);
        let elite: Vec<AgentId> = split.elite.iter().map(|&i| scored[i].0).collect();
        let eliminated: Vec<AgentId> = split.eliminate.iter().map(|&i| scored[i].0).collect();
        let candidates: Vec<(AgentId, f64)> = split.survivors.iter().map(|&i| scored[i]).collect();

        // Elimination
        for id in &eliminated {
            if let Some(member) = population.remove(*id) {
                hooks.on_eliminated(&member);
            }
        }

        // Breeding
        let mut issues = Vec::new();
        let shortfall = EvolutionError::InsufficientPopulation {
            survivors: candidates.len(),
        };
        let plan = BreedingPlan {
            config: &self.config.evolution,
            profile: &profile,
            hints: hints.as_ref(),
        };
        let mut bred = Vec::with_capacity(eliminated.len());
        for _ in 0..eliminated.len() {
            match breed_child(population, &candidates, &plan, &mut self.rng) {
                BreedOutcome::Bred(offspring) => {
                    let parents = (offspring.parents.first, offspring.parents.second);
                    if offspring.parents.self_cross && !issues.contains(&shortfall) {
                        warn!(
                            "Only {} survivor(s) for {} breeding slot(s) in generation {}; self-crossing",
                            candidates.len(),
                            eliminated.len(),
                            generation
                        );
                        issues.push(shortfall.clone());
                    }
                    if offspring.forced_unlock {
                        debug!("Forced unlock in child of {} x {}", parents.0, parents.1);
                    }
                    let traits = default_traits(&offspring.genome);
                    let id = population.spawn(offspring.genome, FitnessInput::new(offspring.lineage, traits));
                    if let Some(member) = population.get_mut(id) {
                        hooks.on_spawned(member, SpawnOrigin::Bred { parents });
                    }
                    bred.push(id);
                }
                // No survivor means no slot can be filled
                BreedOutcome::InsufficientPopulation => {
                    warn!(
                        "No survivors for {} breeding slot(s) in generation {}",
                        eliminated.len(),
                        generation
                    );
                    issues.push(shortfall.clone());
                    break;
                }
                BreedOutcome::ParentNotFound(id) => {
                    warn!("Parent {} vanished before breeding; slot skipped", id);
                    issues.push(EvolutionError::ParentNotFound(id));
                }
            }
        }

        // Immigration
        let mut immigrants = Vec::new();
        let interval = self.config.evolution.immigration_interval;
        if interval > 0 && generation % interval == 0 {
            for _ in 0..self.config.evolution.immigrants_per_wave {
                let id = population.spawn_genesis(&mut self.rng);
                if let Some(member) = population.get_mut(id) {
                    hooks.on_spawned(member, SpawnOrigin::Immigrant);
                }
                immigrants.push(id);
            }
            info!("Immigration wave: {} genesis members joined", immigrants.len());
        }

        // Diversity measurement
        let diversity = self
            .monitor
            .measure(&population.diversity_samples(), inputs.cycle, &mut self.rng);

        // Recording
        let (min_params, mean_params, max_params) = min_mean_max(
            population
                .members()
                .iter()
                .map(|m| m.genome().get_param_count() as f64),
        );
        let stats = GenerationStats {
            generation,
            cycle: inputs.cycle,
            population_size: population.len(),
            elite_count: elite.len(),
            eliminated_count: eliminated.len(),
            new_agent_count: bred.len() + immigrants.len(),
            min_param_count: min_params as usize,
            mean_param_count: mean_params,
            max_param_count: max_params as usize,
            min_performance,
            mean_performance,
            max_performance,
            profitable_fraction,
            diversity_score: diversity.metrics.diversity_score,
        };

        self.generation = generation;
        self.history.push(stats.clone());
        self.last_evolution_cycle = Some(inputs.cycle);

        let report = CycleReport {
            generation,
            cycle: inputs.cycle,
            profile,
            elite,
            eliminated,
            bred,
            immigrants,
            issues,
            diversity,
            stats,
        };
        hooks.on_cycle_complete(&report);

        info!(
            "Generation {} ({:?} pressure): eliminated {}, bred {}, immigrants {}, population {}",
            generation,
            report.profile.band,
            report.eliminated.len(),
            report.bred.len(),
            report.immigrants.len(),
            report.stats.population_size
        );

        CycleOutcome::Completed(report)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    pub fn diversity_monitor(&self) -> &DiversityMonitor {
        &self.monitor
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn last_evolution_cycle(&self) -> Option<u64> {
        self.last_evolution_cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evolution::hooks::NoopHooks;
    use crate::engines::evolution::pressure::PressureBand;

    fn seeded(config: AppConfig) -> EvolutionManager {
        EvolutionManager::with_rng(config, StdRng::seed_from_u64(3)).unwrap()
    }

    #[test]
    fn test_fixed_profile_when_adaptive_off() {
        let mut config = AppConfig::default();
        config.evolution.adaptive_pressure = false;
        config.evolution.elimination_ratio = 0.4;
        config.evolution.base_mutation_rate = 0.2;
        let manager = seeded(config);

        let profile = manager.resolve_profile(Some(0.95));
        assert_eq!(profile.band, PressureBand::Fixed);
        assert_eq!(profile.elimination_rate, 0.4);
        assert_eq!(profile.mutation_rate, 0.2);
        assert!(!profile.forced_unlock);
    }

    #[test]
    fn test_cycle_advances_generation_and_history() {
        let mut manager = seeded(AppConfig::default());
        let mut rng = StdRng::seed_from_u64(5);
        let mut population = Population::seed_genesis(6, &mut rng);

        let outcome = manager.run_evolution_cycle(
            &mut population,
            CycleInputs { cycle: 12, pressure: None },
            &mut NoopHooks,
        );

        let report = outcome.report().unwrap();
        assert_eq!(report.generation, 1);
        assert_eq!(manager.generation(), 1);
        assert_eq!(manager.history().len(), 1);
        assert_eq!(manager.last_evolution_cycle(), Some(12));
        assert_eq!(manager.diversity_monitor().history().len(), 1);
        assert!(report.to_json().unwrap().contains("\"generation\": 1"));
    }

    #[test]
    fn test_single_member_self_crosses() {
        let mut config = AppConfig::default();
        config.evolution.elite_ratio = 0.0;
        config.evolution.adaptive_pressure = false;
        config.evolution.elimination_ratio = 0.5;
        let mut manager = seeded(config);
        let mut rng = StdRng::seed_from_u64(5);
        let mut population = Population::seed_genesis(2, &mut rng);

        let outcome = manager.run_evolution_cycle(&mut population, CycleInputs::default(), &mut NoopHooks);
        let report = outcome.report().unwrap();

        assert_eq!(report.eliminated.len(), 1);
        assert_eq!(report.bred.len(), 1);
        assert_eq!(population.len(), 2);
        assert!(report
            .issues
            .contains(&EvolutionError::InsufficientPopulation { survivors: 1 }));
    }
}

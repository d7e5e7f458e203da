use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use tradevolve::config::AppConfig;
use tradevolve::engines::evolution::{
    breed_child, BreedOutcome, BreedingPlan, CycleInputs, CycleOutcome, EvolutionManager, EvolutionTrigger,
    Member, NoopHooks, Population, PopulationHooks, PressureBand, PressureProfile, SpawnOrigin,
};
use tradevolve::engines::genome::{Param, UnlockHints, RARE_PARAMS};
use tradevolve::types::{AgentId, PerformanceStats};
use tradevolve::EvolutionError;

/// Records every population change it is told about
#[derive(Default)]
struct RecordingHooks {
    eliminated: Vec<AgentId>,
    spawned: Vec<(AgentId, SpawnOrigin)>,
    completed: usize,
    hints: Option<UnlockHints>,
}

impl PopulationHooks for RecordingHooks {
    fn unlock_hints(&mut self) -> Option<UnlockHints> {
        self.hints.clone()
    }

    fn on_eliminated(&mut self, member: &Member) {
        self.eliminated.push(member.id());
    }

    fn on_spawned(&mut self, member: &mut Member, origin: SpawnOrigin) {
        member.fitness_mut().family = "newcomer".to_string();
        self.spawned.push((member.id(), origin));
    }

    fn on_cycle_complete(&mut self, _report: &tradevolve::engines::evolution::CycleReport) {
        self.completed += 1;
    }
}

fn manager_with(config: AppConfig, seed: u64) -> EvolutionManager {
    EvolutionManager::with_rng(config, StdRng::seed_from_u64(seed)).unwrap()
}

/// Members with even index win, odd index lose
fn assign_mixed_stats(population: &mut Population) {
    for (i, member) in population.iter_mut().enumerate() {
        member.fitness_mut().stats = if i % 2 == 0 {
            PerformanceStats::from_counts(500.0, 10, 7)
        } else {
            PerformanceStats::from_counts(-300.0, 10, 3)
        };
    }
}

fn scenario_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.evolution.elite_ratio = 0.2;
    config.evolution.elimination_ratio = 0.3;
    config
}

#[test]
fn test_ten_member_scenario() {
    let mut rng = StdRng::seed_from_u64(10);
    let mut population = Population::seed_genesis(10, &mut rng);
    assign_mixed_stats(&mut population);
    let losers: HashSet<AgentId> = population.ids().into_iter().skip(1).step_by(2).collect();

    let mut manager = manager_with(scenario_config(), 10);
    let mut hooks = RecordingHooks::default();
    let outcome = manager.run_evolution_cycle(&mut population, CycleInputs { cycle: 1, pressure: None }, &mut hooks);

    let report = outcome.report().expect("cycle should complete");
    assert_eq!(report.eliminated.len(), 3);
    assert_eq!(report.bred.len(), 3);
    assert_eq!(report.elite.len(), 2);
    assert_eq!(population.len(), 10);
    assert!(report.eliminated.iter().all(|id| losers.contains(id)));
    assert!(report.issues.is_empty());

    assert_eq!(hooks.eliminated, report.eliminated);
    assert_eq!(hooks.spawned.len(), 3);
    assert_eq!(hooks.completed, 1);

    let stats = &report.stats;
    assert_eq!(stats.eliminated_count, 3);
    assert_eq!(stats.new_agent_count, 3);
    assert_eq!(stats.population_size, 10);
    assert_eq!(stats.min_performance, -300.0);
    assert_eq!(stats.max_performance, 500.0);
    assert!((stats.profitable_fraction - 0.5).abs() < 1e-12);
    assert_eq!(stats.min_param_count, 3);
}

#[test]
fn test_bred_members_descend_from_survivors() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut population = Population::seed_genesis(10, &mut rng);
    assign_mixed_stats(&mut population);

    let mut manager = manager_with(scenario_config(), 11);
    let mut hooks = RecordingHooks::default();
    let outcome = manager.run_evolution_cycle(&mut population, CycleInputs::default(), &mut hooks);
    let report = outcome.report().unwrap();

    for id in &report.bred {
        let member = population.get(*id).unwrap();
        // Crossover of genesis parents, optionally followed by one mutation
        assert!(matches!(member.genome().generation(), 1 | 2));
        for parent in member.genome().parent_ids() {
            assert!(!report.eliminated.contains(parent));
            assert!(population.get(*parent).is_some());
        }
        assert!((member.fitness().lineage.total() - 1.0).abs() < 1e-9);
        // The spawn hook may rewrite the fitness facet
        assert_eq!(member.fitness().family, "newcomer");
    }
    for (_, origin) in &hooks.spawned {
        assert!(matches!(origin, SpawnOrigin::Bred { .. }));
    }
}

#[test]
fn test_seeded_cycles_are_deterministic() {
    fn run(seed: u64) -> Vec<(AgentId, Vec<u8>)> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut population = Population::seed_genesis(24, &mut rng);
        let mut manager = manager_with(AppConfig::default(), seed);

        for cycle in 1..=12 {
            assign_mixed_stats(&mut population);
            let pressure = Some((cycle as f64 * 0.17) % 1.0);
            manager.run_evolution_cycle(&mut population, CycleInputs { cycle, pressure }, &mut NoopHooks);
        }

        population
            .members()
            .iter()
            .map(|m| (m.id(), m.genome().canonical_bytes()))
            .collect()
    }

    assert_eq!(run(77), run(77));
    assert_ne!(run(77), run(78));
}

#[test]
fn test_elites_are_never_eliminated() {
    let mut rng = StdRng::seed_from_u64(12);
    let mut population = Population::seed_genesis(30, &mut rng);
    let mut config = AppConfig::default();
    config.evolution.elite_ratio = 0.5;
    let mut manager = manager_with(config, 12);

    for cycle in 0..15 {
        for (i, member) in population.iter_mut().enumerate() {
            member.fitness_mut().stats = PerformanceStats::from_counts(((i * 37) % 11) as f64, 5, 2);
        }
        let outcome =
            manager.run_evolution_cycle(&mut population, CycleInputs { cycle, pressure: Some(0.1) }, &mut NoopHooks);
        let report = outcome.report().unwrap();

        for elite in &report.elite {
            assert!(!report.eliminated.contains(elite));
            assert!(population.get(*elite).is_some());
        }
    }
}

#[test]
fn test_population_changes_only_by_immigrants() {
    let mut rng = StdRng::seed_from_u64(13);
    let mut population = Population::seed_genesis(20, &mut rng);
    let mut config = AppConfig::default();
    config.evolution.immigration_interval = 2;
    config.evolution.immigrants_per_wave = 4;
    let mut manager = manager_with(config, 13);
    let mut hooks = RecordingHooks::default();

    let mut waves = 0;
    for cycle in 1..=6 {
        assign_mixed_stats(&mut population);
        let before = population.len();
        let outcome =
            manager.run_evolution_cycle(&mut population, CycleInputs { cycle, pressure: Some(0.5) }, &mut hooks);
        let report = outcome.report().unwrap();

        assert_eq!(population.len() - before, report.immigrants.len());
        assert_eq!(report.bred.len(), report.eliminated.len());
        if !report.immigrants.is_empty() {
            assert_eq!(report.generation % 2, 0);
            assert_eq!(report.immigrants.len(), 4);
            waves += 1;
        }
    }

    assert_eq!(waves, 3);
    assert_eq!(population.len(), 32);
    let immigrant_spawns = hooks
        .spawned
        .iter()
        .filter(|(_, origin)| *origin == SpawnOrigin::Immigrant)
        .count();
    assert_eq!(immigrant_spawns, 12);
}

#[test]
fn test_extreme_pressure_cycle() {
    let mut rng = StdRng::seed_from_u64(14);
    let mut population = Population::seed_genesis(20, &mut rng);
    assign_mixed_stats(&mut population);

    let mut config = AppConfig::default();
    config.evolution.forced_unlock_chance = 1.0;
    let mut manager = manager_with(config, 14);

    let profile = manager.resolve_profile(Some(0.9));
    assert_eq!(profile, PressureProfile::from_pressure(Some(0.9)));
    assert_eq!(profile.elimination_rate, 0.15);
    assert_eq!(profile.mutation_rate, 0.60);
    assert!(profile.forced_unlock);

    let outcome =
        manager.run_evolution_cycle(&mut population, CycleInputs { cycle: 1, pressure: Some(0.9) }, &mut NoopHooks);
    let report = outcome.report().unwrap();

    assert_eq!(report.profile.band, PressureBand::Extreme);
    assert_eq!(report.eliminated.len(), 3);
    for id in &report.bred {
        let genome = population.get(*id).unwrap().genome();
        assert!(RARE_PARAMS.iter().any(|p| genome.is_active(*p)));
    }
}

#[test]
fn test_empty_population_is_skipped() {
    let mut population = Population::new();
    let mut manager = manager_with(AppConfig::default(), 15);

    let outcome = manager.run_evolution_cycle(&mut population, CycleInputs { cycle: 4, pressure: None }, &mut NoopHooks);

    assert_eq!(
        outcome,
        CycleOutcome::Skipped {
            cycle: 4,
            reason: EvolutionError::EmptyPopulation
        }
    );
    assert_eq!(manager.generation(), 0);
    assert!(manager.history().is_empty());
    assert_eq!(manager.last_evolution_cycle(), None);
}

#[test]
fn test_stale_parent_skips_slot() {
    let mut rng = StdRng::seed_from_u64(16);
    let mut population = Population::seed_genesis(4, &mut rng);
    let stale = population.ids()[0];
    population.remove(stale);

    let config = AppConfig::default();
    let profile = PressureProfile::from_pressure(None);
    let plan = BreedingPlan {
        config: &config.evolution,
        profile: &profile,
        hints: None,
    };

    let outcome = breed_child(&population, &[(stale, 10.0)], &plan, &mut rng);
    assert!(matches!(outcome, BreedOutcome::ParentNotFound(id) if id == stale));
    assert_eq!(population.len(), 3);
}

#[test]
fn test_invalid_config_fails_fast() {
    let mut config = AppConfig::default();
    config.evolution.elite_ratio = 0.8;
    config.evolution.elimination_ratio = 0.3;

    assert!(matches!(EvolutionManager::new(config), Err(EvolutionError::Configuration(_))));
}

#[test]
fn test_trigger_priority() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut population = Population::seed_genesis(5, &mut rng);
    let manager = manager_with(AppConfig::default(), 17);

    // No trades, nobody profitable, but the emergency floor is not reached yet
    assert_eq!(manager.should_run_evolution(&population, 5), None);
    assert!(matches!(
        manager.should_run_evolution(&population, 10),
        Some(EvolutionTrigger::Crisis { .. })
    ));
    assert!(matches!(
        manager.should_run_evolution(&population, 50),
        Some(EvolutionTrigger::FallbackInterval { cycles_since_last: 50 })
    ));

    for member in population.iter_mut() {
        member.fitness_mut().stats = PerformanceStats::from_counts(100.0, 25, 15);
    }
    assert!(matches!(
        manager.should_run_evolution(&population, 50),
        Some(EvolutionTrigger::TradeThreshold { .. })
    ));

    // Healthy, profitable, low activity: nothing fires
    for member in population.iter_mut() {
        member.fitness_mut().stats = PerformanceStats::from_counts(100.0, 3, 2);
    }
    assert_eq!(manager.should_run_evolution(&population, 20), None);
}

#[test]
fn test_repeated_cycles_keep_population_stable() {
    let mut rng = StdRng::seed_from_u64(18);
    let mut population = Population::seed_genesis(12, &mut rng);
    let mut config = AppConfig::default();
    config.evolution.immigration_interval = 0;
    let mut manager = manager_with(config, 18);
    let mut hooks = RecordingHooks {
        hints: Some(UnlockHints::new([Param::StopLossTightness])),
        ..Default::default()
    };

    for cycle in 1..=8 {
        assign_mixed_stats(&mut population);
        manager.run_evolution_cycle(&mut population, CycleInputs { cycle, pressure: Some(0.7) }, &mut hooks);
    }

    assert_eq!(manager.generation(), 8);
    assert_eq!(manager.history().len(), 8);
    assert_eq!(population.len(), 12);
    assert!(hooks.spawned.iter().all(|(_, o)| matches!(o, SpawnOrigin::Bred { .. })));
}

#[test]
fn test_small_survivor_pools_breed_distinct_parents() {
    for (size, elimination_ratio) in [(4usize, 0.3), (4, 0.5)] {
        let mut config = AppConfig::default();
        config.evolution.adaptive_pressure = false;
        config.evolution.elimination_ratio = elimination_ratio;
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut population = Population::seed_genesis(size, &mut rng);
            assign_mixed_stats(&mut population);
            let mut manager = manager_with(config.clone(), seed);

            let outcome = manager.run_evolution_cycle(&mut population, CycleInputs::default(), &mut NoopHooks);
            let report = outcome.report().expect("cycle should complete");

            assert!(!report.bred.is_empty());
            for id in &report.bred {
                let parents = population.get(*id).unwrap().genome().parent_ids();
                assert_eq!(parents.len(), 2);
                assert_ne!(parents[0], parents[1], "self-cross with {} survivors", size - report.eliminated.len());
            }
            assert!(report.issues.is_empty());
            assert!(!report.is_degraded());
        }
    }
}

#[test]
fn test_lone_survivor_degrades_report() {
    let mut config = AppConfig::default();
    config.evolution.elite_ratio = 0.0;
    config.evolution.adaptive_pressure = false;
    config.evolution.elimination_ratio = 0.5;
    let mut rng = StdRng::seed_from_u64(8);
    let mut population = Population::seed_genesis(2, &mut rng);
    assign_mixed_stats(&mut population);
    let mut manager = manager_with(config, 8);

    let outcome = manager.run_evolution_cycle(&mut population, CycleInputs::default(), &mut NoopHooks);
    let report = outcome.report().expect("cycle should complete");

    assert_eq!(report.bred.len(), 1);
    let parents = population.get(report.bred[0]).unwrap().genome().parent_ids();
    assert_eq!(parents[0], parents[1]);
    assert!(report.is_degraded());
    assert_eq!(report.issues, vec![EvolutionError::InsufficientPopulation { survivors: 1 }]);
}

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use tradevolve::config::ConfigManager;
use tradevolve::engines::evolution::{CycleInputs, CycleOutcome, EvolutionManager, LoggingHooks, Population};
use tradevolve::engines::genome::{Genome, Param};
use tradevolve::types::PerformanceStats;

/// Headless driver running the evolution engine over a synthetic market
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Optional TOML config; `TRADEVOLVE__SECTION__FIELD` variables override it
    #[arg(short, long)]
    config: Option<String>,

    #[arg(long, default_value_t = 200)]
    cycles: u64,

    #[arg(short, long, default_value_t = 40)]
    population: usize,

    /// Overrides `evolution.seed`
    #[arg(short, long)]
    seed: Option<u64>,

    /// Append one JSON cycle report per line to this file
    #[arg(short, long)]
    report: Option<String>,
}

const TRADES_PER_CYCLE: u32 = 2;

/// Toy per-trade edge: members near a fixed sweet spot make money
fn synthetic_edge(genome: &Genome, rng: &mut StdRng) -> f64 {
    let risk = genome.value(Param::RiskAppetite).unwrap_or(0.5);
    let patience = genome.value(Param::Patience).unwrap_or(0.5);
    let bonus = genome.value(Param::DrawdownTolerance).map_or(0.0, |v| 0.1 * v);
    let noise: f64 = rng.gen_range(-0.1..0.1);
    50.0 * (0.5 - (risk - 0.7).abs() - (patience - 0.4).abs() + bonus + noise)
}

fn simulate_cycle(population: &mut Population, rng: &mut StdRng) {
    for member in population.iter_mut() {
        let edge = synthetic_edge(member.genome(), rng);
        let stats = &mut member.fitness_mut().stats;
        let trades = stats.trade_count + TRADES_PER_CYCLE;
        let pnl = stats.total_pnl + edge * TRADES_PER_CYCLE as f64;
        let win_rate = (0.5 + edge / 100.0).clamp(0.0, 1.0);
        *stats = PerformanceStats::new(pnl, win_rate, trades);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let manager = ConfigManager::new();
    manager
        .load_layered(args.config.as_deref(), "TRADEVOLVE")
        .context("Failed to load configuration")?;
    if let Some(seed) = args.seed {
        manager.update(|c| c.evolution.seed = Some(seed))?;
    }
    let config = manager.get();

    let seed = config.evolution.seed.unwrap_or(42);
    let mut market_rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let mut population = Population::seed_genesis(args.population, &mut market_rng);
    let mut engine = EvolutionManager::new(config)?;
    let mut hooks = LoggingHooks;

    let mut report_file = match &args.report {
        Some(path) => Some(
            std::fs::File::create(path).with_context(|| format!("Failed to create report file {}", path))?,
        ),
        None => None,
    };

    for cycle in 1..=args.cycles {
        simulate_cycle(&mut population, &mut market_rng);

        let Some(trigger) = engine.should_run_evolution(&population, cycle) else {
            continue;
        };
        log::info!("Cycle {}: evolution triggered by {:?}", cycle, trigger);

        // Losing populations push harder
        let pressure = 1.0 - population.profitable_fraction();
        let outcome = engine.run_evolution_cycle(
            &mut population,
            CycleInputs { cycle, pressure: Some(pressure) },
            &mut hooks,
        );

        match outcome {
            CycleOutcome::Completed(report) => {
                if let Some(file) = report_file.as_mut() {
                    writeln!(file, "{}", serde_json::to_string(&report)?)?;
                }
                // Fresh evaluation window for everyone
                for member in population.iter_mut() {
                    member.fitness_mut().stats = PerformanceStats::default();
                }
            }
            CycleOutcome::Skipped { cycle, reason } => {
                log::warn!("Cycle {} skipped: {}", cycle, reason);
            }
        }
    }

    let history = engine.history();
    println!("Ran {} generations over {} cycles", engine.generation(), args.cycles);
    if let Some(last) = history.last() {
        println!(
            "Final population {}: params {}..{} (mean {:.1}), diversity {:.3}",
            last.population_size,
            last.min_param_count,
            last.max_param_count,
            last.mean_param_count,
            last.diversity_score
        );
    }
    if let Some(metrics) = engine.diversity_monitor().latest() {
        println!(
            "Gene entropy {:.2}, lineage entropy {:.2}, {} active families, healthy: {}",
            metrics.gene_entropy, metrics.lineage_entropy, metrics.active_family_count, metrics.is_healthy
        );
    }

    Ok(())
}

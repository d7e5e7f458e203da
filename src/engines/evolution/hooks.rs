use super::manager::CycleReport;
use super::population::{Member, SpawnOrigin};
use crate::engines::genome::UnlockHints;
use log::{info, warn};

/// Collaborator callbacks invoked at fixed points of an evolution cycle
pub trait PopulationHooks {
    /// Parameters the environment wants prioritized for unlocking this cycle
    fn unlock_hints(&mut self) -> Option<UnlockHints> {
        None
    }

    /// A member was removed; release any state kept for it
    fn on_eliminated(&mut self, _member: &Member) {}

    /// A member was inserted; adjust its fitness facet if needed
    fn on_spawned(&mut self, _member: &mut Member, _origin: SpawnOrigin) {}

    fn on_cycle_complete(&mut self, _report: &CycleReport) {}
}

pub struct NoopHooks;

impl PopulationHooks for NoopHooks {}

/// Logs every population change
pub struct LoggingHooks;

impl PopulationHooks for LoggingHooks {
    fn on_eliminated(&mut self, member: &Member) {
        info!(
            "Eliminated {} (generation {}, {} params, pnl {:.2})",
            member.id(),
            member.genome().generation(),
            member.genome().get_param_count(),
            member.fitness().stats.total_pnl
        );
    }

    fn on_spawned(&mut self, member: &mut Member, origin: SpawnOrigin) {
        info!(
            "Spawned {} as {:?} ({} params)",
            member.id(),
            origin,
            member.genome().get_param_count()
        );
    }

    fn on_cycle_complete(&mut self, report: &CycleReport) {
        info!(
            "Generation {} complete. Population: {}, diversity: {:.3}",
            report.stats.generation, report.stats.population_size, report.stats.diversity_score
        );
        if report.is_degraded() {
            for issue in &report.issues {
                warn!("Generation {} recovered from: {}", report.generation, issue);
            }
        }
    }
}

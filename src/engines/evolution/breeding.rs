use super::population::Population;
use super::pressure::PressureProfile;
use crate::config::EvolutionConfig;
use crate::engines::genome::{Genome, UnlockHints, RARE_PARAMS};
use crate::engines::selection::{select_parents, ParentSelection};
use crate::types::{AgentId, LineageVector};
use log::{debug, warn};
use rand::Rng;

/// Everything one breeding slot needs besides the population
pub struct BreedingPlan<'a> {
    pub config: &'a EvolutionConfig,
    pub profile: &'a PressureProfile,
    pub hints: Option<&'a UnlockHints>,
}

#[derive(Debug, Clone)]
pub struct Offspring {
    pub genome: Genome,
    pub lineage: LineageVector,
    pub parents: ParentSelection,
    pub forced_unlock: bool,
}

#[derive(Debug, Clone)]
pub enum BreedOutcome {
    Bred(Offspring),
    /// No survivor to breed from
    InsufficientPopulation,
    /// A selected parent is no longer in the population
    ParentNotFound(AgentId),
}

/// Fill one eliminated slot: tournament-select two parents from `candidates`,
/// cross them, then maybe mutate and force-unlock the child.
pub fn breed_child<R: Rng + ?Sized>(
    population: &Population,
    candidates: &[(AgentId, f64)],
    plan: &BreedingPlan<'_>,
    rng: &mut R,
) -> BreedOutcome {
    let config = plan.config;

    let Some(parents) = select_parents(candidates, config.tournament_size, config.parent_retry_limit, rng) else {
        return BreedOutcome::InsufficientPopulation;
    };
    if parents.self_cross {
        warn!("Self-crossing {} ({} candidate parents)", parents.first, candidates.len());
    }

    let Some(first) = population.get(parents.first) else {
        return BreedOutcome::ParentNotFound(parents.first);
    };
    let Some(second) = population.get(parents.second) else {
        return BreedOutcome::ParentNotFound(parents.second);
    };

    let mut child = first
        .genome()
        .crossover(second.genome(), Some(first.id()), Some(second.id()), rng);

    if rng.gen::<f64>() < plan.profile.mutation_rate {
        child = child.mutate(
            config.breed_mutation_rate,
            config.breed_mutation_strength,
            plan.hints,
            rng,
        );
    }

    let mut forced_unlock = false;
    if plan.profile.forced_unlock
        && child.get_param_count() < config.forced_unlock_param_cap
        && rng.gen::<f64>() < config.forced_unlock_chance
    {
        if let Some(unlocked) = child.force_unlock(&RARE_PARAMS, rng) {
            child = unlocked;
            forced_unlock = true;
        }
    }

    let lineage = LineageVector::blend(&first.fitness().lineage, &second.fitness().lineage, 0.5);

    debug!(
        "Bred child of {} x {}: generation {}, {} params",
        parents.first,
        parents.second,
        child.generation(),
        child.get_param_count()
    );

    BreedOutcome::Bred(Offspring {
        genome: child,
        lineage,
        parents,
        forced_unlock,
    })
}

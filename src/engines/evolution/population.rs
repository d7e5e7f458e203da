use crate::engines::diversity::DiversitySample;
use crate::engines::genome::{Genome, Param};
use crate::types::{AgentId, FitnessInput, LineageVector, StrategyTraits};
use rand::Rng;

/// One live population member. The genome is fixed for the member's lifetime;
/// only the harness-maintained fitness facet changes.
#[derive(Debug, Clone)]
pub struct Member {
    id: AgentId,
    genome: Genome,
    fitness: FitnessInput,
}

impl Member {
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn fitness(&self) -> &FitnessInput {
        &self.fitness
    }

    pub fn fitness_mut(&mut self) -> &mut FitnessInput {
        &mut self.fitness
    }

    pub fn diversity_sample(&self) -> DiversitySample<'_> {
        DiversitySample {
            genome: &self.genome,
            traits: self.fitness.traits,
            lineage: &self.fitness.lineage,
            family: &self.fitness.family,
        }
    }
}

/// How a member entered the population
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOrigin {
    Genesis,
    Bred { parents: (AgentId, AgentId) },
    Immigrant,
}

/// Default strategy traits read straight off the genome
pub fn default_traits(genome: &Genome) -> StrategyTraits {
    StrategyTraits::new(
        genome.value(Param::RiskAppetite).unwrap_or(0.5),
        genome.value(Param::Patience).unwrap_or(0.5),
    )
}

/// Live population with sequential id allocation
#[derive(Debug, Clone, Default)]
pub struct Population {
    members: Vec<Member>,
    next_id: u64,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Population of `count` genesis members, each founding its own family
    pub fn seed_genesis<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let mut population = Self::new();
        for _ in 0..count {
            population.spawn_genesis(rng);
        }
        population
    }

    /// Insert a member wrapping `genome` under a fresh id
    pub fn spawn(&mut self, genome: Genome, fitness: FitnessInput) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        self.members.push(Member { id, genome, fitness });
        id
    }

    /// Insert a fresh genesis member founding a new family
    pub fn spawn_genesis<R: Rng + ?Sized>(&mut self, rng: &mut R) -> AgentId {
        let genome = Genome::create_genesis(rng);
        let family = format!("family-{:05}", self.next_id);
        let traits = default_traits(&genome);
        self.spawn(genome, FitnessInput::new(LineageVector::single(family), traits))
    }

    /// Remove a member, keeping the order of the rest
    pub fn remove(&mut self, id: AgentId) -> Option<Member> {
        let pos = self.members.iter().position(|m| m.id == id)?;
        Some(self.members.remove(pos))
    }

    pub fn get(&self, id: AgentId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Member> {
        self.members.iter_mut()
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.members.iter().map(|m| m.id).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn diversity_samples(&self) -> Vec<DiversitySample<'_>> {
        self.members.iter().map(|m| m.diversity_sample()).collect()
    }

    pub fn average_trade_count(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members
            .iter()
            .map(|m| m.fitness.stats.trade_count as f64)
            .sum::<f64>()
            / self.members.len() as f64
    }

    pub fn profitable_fraction(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().filter(|m| m.fitness.stats.is_profitable()).count() as f64
            / self.members.len() as f64
    }
}

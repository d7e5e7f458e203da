/// Tiered, evolvable parameter set owned by one population member
///
/// A genome always carries the three core parameters and grows new ones
/// through unlocks as its lineage ages. Genomes are values: `mutate`,
/// `crossover` and `force_unlock` return new genomes and never touch `self`.
///
/// Parameters are stored densely, one slot per [`Param`], so the set of valid
/// names is fixed at compile time.
use super::parameters::{Param, PARAM_COUNT};
use crate::error::EvolutionError;
use crate::types::AgentId;
use crate::utils::history::BoundedHistory;
use crate::utils::sampling::{beta_2_2, gaussian, weighted_index};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const MUTATION_HISTORY_CAPACITY: usize = 64;
pub const DEFAULT_PARAM_VALUE: f64 = 0.5;

const UNLOCK_CHANCE_PER_GENERATION: f64 = 0.02;
const MAX_UNLOCK_CHANCE: f64 = 0.25;
const HINT_WEIGHT_MULTIPLIER: f64 = 3.0;
const UNLOCK_VALUE_RANGE: std::ops::Range<f64> = 0.3..0.7;
const CROSSOVER_BLEND_CHANCE: f64 = 0.7;
const CROSSOVER_INHERIT_CHANCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Perturb,
    Unlock,
    ForcedUnlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    pub param: Param,
    pub old_value: Option<f64>, // None for unlocks
    pub new_value: f64,
    pub kind: MutationKind,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityLevel {
    Simple,
    Medium,
    Complex,
    Advanced,
}

/// Parameters the environment suggests prioritizing when unlocking
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnlockHints {
    pub suggested: HashSet<Param>,
}

impl UnlockHints {
    pub fn new<I: IntoIterator<Item = Param>>(params: I) -> Self {
        Self {
            suggested: params.into_iter().collect(),
        }
    }

    /// Build hints from parameter names, skipping names outside the universe
    pub fn from_names<'a, I: IntoIterator<Item = &'a str>>(names: I) -> Self {
        let mut suggested = HashSet::new();
        for name in names {
            match name.parse::<Param>() {
                Ok(param) => {
                    suggested.insert(param);
                }
                Err(e) => warn!("Ignoring unlock hint: {}", e),
            }
        }
        Self { suggested }
    }

    pub fn contains(&self, param: Param) -> bool {
        self.suggested.contains(&param)
    }

    pub fn is_empty(&self) -> bool {
        self.suggested.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GenomeRecord", into = "GenomeRecord")]
pub struct Genome {
    values: [Option<f64>; PARAM_COUNT],
    generation: u32,
    parent_ids: Vec<AgentId>,
    unlocked_parameters: Vec<Param>,
    mutation_history: BoundedHistory<MutationRecord>,
}

impl Genome {
    fn empty(generation: u32) -> Self {
        Self {
            values: [None; PARAM_COUNT],
            generation,
            parent_ids: Vec::new(),
            unlocked_parameters: Vec::new(),
            mutation_history: BoundedHistory::new(MUTATION_HISTORY_CAPACITY),
        }
    }

    /// Plant a value without validation, e.g. a corrupted one
    #[cfg(test)]
    fn with_raw_value(mut self, param: Param, value: f64) -> Self {
        self.values[param.index()] = Some(value);
        self
    }

    /// Core-only genome at generation 0, each core value drawn from Beta(2, 2)
    pub fn create_genesis<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut genome = Self::empty(0);
        for param in Param::CORE {
            genome.values[param.index()] = Some(beta_2_2(rng));
        }
        genome
    }

    /// Rebuild a genome from named values.
    ///
    /// Unknown names and values that are non-finite or outside [0, 1] are
    /// skipped with a warning. Missing core parameters are filled with 0.5.
    pub fn from_values<'a, I>(values: I, generation: u32) -> Self
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut genome = Self::empty(generation);
        for (name, value) in values {
            let param = match name.parse::<Param>() {
                Ok(p) => p,
                Err(e) => {
                    warn!("Skipping genome entry: {}", e);
                    continue;
                }
            };
            match checked_value(param, value) {
                Ok(v) => genome.values[param.index()] = Some(v),
                Err(e) => warn!("Skipping genome entry: {}", e),
            }
        }
        genome.ensure_core(None, None);
        genome
    }

    pub fn value(&self, param: Param) -> Option<f64> {
        self.values[param.index()]
    }

    pub fn is_active(&self, param: Param) -> bool {
        self.values[param.index()].is_some()
    }

    /// Active parameters in universe order
    pub fn active_parameters(&self) -> impl Iterator<Item = (Param, f64)> + '_ {
        Param::ALL
            .iter()
            .filter_map(move |&p| self.values[p.index()].map(|v| (p, v)))
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn parent_ids(&self) -> &[AgentId] {
        &self.parent_ids
    }

    pub fn unlocked_parameters(&self) -> &[Param] {
        &self.unlocked_parameters
    }

    pub fn mutation_history(&self) -> &BoundedHistory<MutationRecord> {
        &self.mutation_history
    }

    pub fn get_param_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn get_complexity_level(&self) -> ComplexityLevel {
        match self.get_param_count() {
            0..=3 => ComplexityLevel::Simple,
            4..=6 => ComplexityLevel::Medium,
            7..=9 => ComplexityLevel::Complex,
            _ => ComplexityLevel::Advanced,
        }
    }

    /// Perturb active parameters and possibly unlock one new parameter.
    ///
    /// Each active parameter is replaced with probability `rate` by
    /// `clamp(value + N(0, strength), 0, 1)`. Independently, with probability
    /// `min(0.25, generation * 0.02)`, one tier-eligible inactive parameter is
    /// unlocked, hinted parameters weighted 3x.
    pub fn mutate<R: Rng + ?Sized>(
        &self,
        rate: f64,
        strength: f64,
        hints: Option<&UnlockHints>,
        rng: &mut R,
    ) -> Genome {
        let rate = if rate.is_finite() { rate.clamp(0.0, 1.0) } else { 0.0 };
        let strength = if strength.is_finite() { strength.max(0.0) } else { 0.0 };

        let mut child = self.clone();

        for param in Param::ALL {
            let Some(raw) = self.values[param.index()] else {
                continue;
            };
            if rng.gen::<f64>() >= rate {
                continue;
            }
            let old = match checked_value(param, raw) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Mutation skipped: {}", e);
                    continue;
                }
            };
            let new = (old + gaussian(rng, 0.0, strength)).clamp(0.0, 1.0);
            child.values[param.index()] = Some(new);
            child.record(param, Some(old), new, MutationKind::Perturb);
        }

        let unlock_chance = (self.generation as f64 * UNLOCK_CHANCE_PER_GENERATION).min(MAX_UNLOCK_CHANCE);
        if rng.gen::<f64>() < unlock_chance {
            child.unlock_from_tiers(self.generation, hints, rng);
        }

        child.generation = self.generation.saturating_add(1);
        child
    }

    /// Combine two parents into a child genome.
    ///
    /// Shared parameters are averaged (70%) or taken from one parent (30%).
    /// Parameters carried by only one parent survive with 30% probability, so
    /// traits can be lost between generations. Core parameters are always
    /// restored afterwards.
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        other: &Genome,
        parent1_id: Option<AgentId>,
        parent2_id: Option<AgentId>,
        rng: &mut R,
    ) -> Genome {
        let mut child = Self::empty(self.generation.max(other.generation).saturating_add(1));

        for param in Param::ALL {
            let a = self.valid_value(param);
            let b = other.valid_value(param);

            child.values[param.index()] = match (a, b) {
                (Some(a), Some(b)) => {
                    if rng.gen::<f64>() < CROSSOVER_BLEND_CHANCE {
                        Some((a + b) / 2.0)
                    } else if rng.gen_bool(0.5) {
                        Some(a)
                    } else {
                        Some(b)
                    }
                }
                (Some(v), None) | (None, Some(v)) => {
                    if rng.gen::<f64>() < CROSSOVER_INHERIT_CHANCE {
                        Some(v)
                    } else {
                        None
                    }
                }
                (None, None) => None,
            };
        }

        child.ensure_core(Some(self), Some(other));

        child.parent_ids = match (parent1_id, parent2_id) {
            (Some(p1), Some(p2)) => vec![p1, p2],
            (p1, p2) => {
                warn!(
                    "Crossover without parent ids ({:?}, {:?}); recording placeholder lineage",
                    p1, p2
                );
                vec![p1.unwrap_or(AgentId::UNKNOWN), p2.unwrap_or(AgentId::UNKNOWN)]
            }
        };

        for &param in self.unlocked_parameters.iter().chain(other.unlocked_parameters.iter()) {
            if child.is_active(param) && !param.is_core() && !child.unlocked_parameters.contains(&param) {
                child.unlocked_parameters.push(param);
            }
        }

        child
    }

    /// Unlock one parameter from `pool` regardless of tier floors and odds.
    /// Returns `None` when every pool parameter is already active.
    pub fn force_unlock<R: Rng + ?Sized>(&self, pool: &[Param], rng: &mut R) -> Option<Genome> {
        let candidates: Vec<Param> = pool.iter().copied().filter(|p| !self.is_active(*p)).collect();
        if candidates.is_empty() {
            return None;
        }

        let param = candidates[rng.gen_range(0..candidates.len())];
        let value = rng.gen_range(UNLOCK_VALUE_RANGE);

        let mut child = self.clone();
        child.activate(param, value, MutationKind::ForcedUnlock);
        debug!("Forced unlock of {} at {:.3}", param, value);
        Some(child)
    }

    /// Euclidean distance over the union of both active sets; a parameter
    /// missing on one side reads as 0.5
    pub fn distance(&self, other: &Genome) -> f64 {
        let mut sum = 0.0;
        for param in Param::ALL {
            let (a, b) = match (self.value(param), other.value(param)) {
                (None, None) => continue,
                (a, b) => (
                    a.unwrap_or(DEFAULT_PARAM_VALUE),
                    b.unwrap_or(DEFAULT_PARAM_VALUE),
                ),
            };
            sum += (a - b).powi(2);
        }
        sum.sqrt()
    }

    /// Stable byte encoding of the genome state, excluding wall-clock
    /// timestamps of its mutation history
    pub fn canonical_bytes(&self) -> Vec<u8> {
        #[derive(Serialize)]
        struct Canonical<'a> {
            values: &'a [Option<f64>; PARAM_COUNT],
            generation: u32,
            parent_ids: &'a [AgentId],
            unlocked: &'a [Param],
            history: Vec<(Param, Option<f64>, f64, MutationKind)>,
        }

        let canonical = Canonical {
            values: &self.values,
            generation: self.generation,
            parent_ids: &self.parent_ids,
            unlocked: &self.unlocked_parameters,
            history: self
                .mutation_history
                .iter()
                .map(|r| (r.param, r.old_value, r.new_value, r.kind))
                .collect(),
        };
        serde_json::to_vec(&canonical).unwrap_or_default()
    }

    fn unlock_from_tiers<R: Rng + ?Sized>(
        &mut self,
        generation: u32,
        hints: Option<&UnlockHints>,
        rng: &mut R,
    ) -> Option<Param> {
        let candidates: Vec<Param> = Param::ALL
            .iter()
            .copied()
            .filter(|p| !self.is_active(*p) && p.tier().unlock_generation <= generation)
            .collect();

        let weights: Vec<f64> = candidates
            .iter()
            .map(|p| {
                let base = p.tier().unlock_probability;
                match hints {
                    Some(h) if h.contains(*p) => base * HINT_WEIGHT_MULTIPLIER,
                    _ => base,
                }
            })
            .collect();

        let param = candidates[weighted_index(&weights, rng)?];
        let value = rng.gen_range(UNLOCK_VALUE_RANGE);
        self.activate(param, value, MutationKind::Unlock);
        debug!("Unlocked {} ({} tier) at {:.3}", param, param.tier().name, value);
        Some(param)
    }

    fn activate(&mut self, param: Param, value: f64, kind: MutationKind) {
        self.values[param.index()] = Some(value);
        if !param.is_core() && !self.unlocked_parameters.contains(&param) {
            self.unlocked_parameters.push(param);
        }
        self.record(param, None, value, kind);
    }

    fn record(&mut self, param: Param, old_value: Option<f64>, new_value: f64, kind: MutationKind) {
        self.mutation_history.push(MutationRecord {
            param,
            old_value,
            new_value,
            kind,
            timestamp: Utc::now(),
        });
    }

    fn valid_value(&self, param: Param) -> Option<f64> {
        let raw = self.values[param.index()]?;
        match checked_value(param, raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Crossover skipped parent value: {}", e);
                None
            }
        }
    }

    /// Restore any missing core parameter from the first parent that has it,
    /// else 0.5
    fn ensure_core(&mut self, first: Option<&Genome>, second: Option<&Genome>) {
        for param in Param::CORE {
            if self.is_active(param) {
                continue;
            }
            let inherited = first
                .and_then(|g| g.valid_value(param))
                .or_else(|| second.and_then(|g| g.valid_value(param)));
            self.values[param.index()] = Some(inherited.unwrap_or(DEFAULT_PARAM_VALUE));
        }
    }
}

fn checked_value(param: Param, value: f64) -> Result<f64, EvolutionError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(EvolutionError::InvalidParameterValue {
            param: param.name().to_string(),
            value,
        })
    }
}

/// Persisted form: parameters keyed by name
#[derive(Serialize, Deserialize)]
struct GenomeRecord {
    active_parameters: BTreeMap<String, f64>,
    generation: u32,
    #[serde(default)]
    parent_ids: Vec<AgentId>,
    #[serde(default)]
    unlocked_parameters: Vec<String>,
    #[serde(default)]
    mutation_history: Vec<StoredMutation>,
}

/// History entry as persisted; the name is parsed on load so one stale entry
/// does not reject the whole genome
#[derive(Serialize, Deserialize)]
struct StoredMutation {
    param: String,
    old_value: Option<f64>,
    new_value: f64,
    kind: MutationKind,
    timestamp: DateTime<Utc>,
}

impl From<&MutationRecord> for StoredMutation {
    fn from(record: &MutationRecord) -> Self {
        Self {
            param: record.param.name().to_string(),
            old_value: record.old_value,
            new_value: record.new_value,
            kind: record.kind,
            timestamp: record.timestamp,
        }
    }
}

impl From<Genome> for GenomeRecord {
    fn from(genome: Genome) -> Self {
        Self {
            active_parameters: genome
                .active_parameters()
                .map(|(p, v)| (p.name().to_string(), v))
                .collect(),
            generation: genome.generation,
            parent_ids: genome.parent_ids.clone(),
            unlocked_parameters: genome
                .unlocked_parameters
                .iter()
                .map(|p| p.name().to_string())
                .collect(),
            mutation_history: genome.mutation_history.iter().map(StoredMutation::from).collect(),
        }
    }
}

impl From<GenomeRecord> for Genome {
    fn from(record: GenomeRecord) -> Self {
        let mut genome = Genome::from_values(
            record.active_parameters.iter().map(|(k, v)| (k.as_str(), *v)),
            record.generation,
        );
        genome.parent_ids = record.parent_ids;
        for name in &record.unlocked_parameters {
            match name.parse::<Param>() {
                Ok(p) if genome.is_active(p) && !p.is_core() => {
                    if !genome.unlocked_parameters.contains(&p) {
                        genome.unlocked_parameters.push(p);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unlock record: {}", e),
            }
        }
        for entry in record.mutation_history {
            match entry.param.parse::<Param>() {
                Ok(param) => {
                    genome.mutation_history.push(MutationRecord {
                        param,
                        old_value: entry.old_value,
                        new_value: entry.new_value,
                        kind: entry.kind,
                        timestamp: entry.timestamp,
                    });
                }
                Err(e) => warn!("Skipping mutation record: {}", e),
            }
        }
        genome
    }
}

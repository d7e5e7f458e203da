pub mod breeding;
pub mod hooks;
pub mod manager;
pub mod population;
pub mod pressure;
pub mod stats;
pub mod trigger;

pub use breeding::{breed_child, BreedOutcome, BreedingPlan, Offspring};
pub use hooks::{LoggingHooks, NoopHooks, PopulationHooks};
pub use manager::{CycleInputs, CycleOutcome, CycleReport, EvolutionManager};
pub use population::{Member, Population, SpawnOrigin};
pub use pressure::{PressureBand, PressureProfile};
pub use stats::GenerationStats;
pub use trigger::EvolutionTrigger;

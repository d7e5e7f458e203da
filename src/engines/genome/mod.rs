pub mod genome;
pub mod parameters;

pub use genome::{ComplexityLevel, Genome, MutationKind, MutationRecord, UnlockHints};
pub use parameters::{Param, Tier, PARAM_COUNT, RARE_PARAMS, TIERS};

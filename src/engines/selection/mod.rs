pub mod fitness;
pub mod ranking;
pub mod tournament;

pub use fitness::FitnessWeights;
pub use ranking::{partition, rank_by_score, Partition};
pub use tournament::{select_parents, tournament_selection, ParentSelection};

pub mod diversity;
pub mod evolution;
pub mod genome;
pub mod selection;

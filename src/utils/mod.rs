pub mod history;
pub mod sampling;

pub use history::BoundedHistory;

pub mod diversity;
pub mod evolution;
pub mod manager;
pub mod traits;
pub mod trigger;

pub use diversity::{DiversityConfig, HealthThresholds};
pub use evolution::EvolutionConfig;
pub use manager::{AppConfig, ConfigManager};
pub use traits::ConfigSection;
pub use trigger::{RunMode, TriggerConfig};

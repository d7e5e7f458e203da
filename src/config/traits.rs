use crate::error::EvolutionError;
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<(), EvolutionError>;
}

/// Shared check for values that must lie in [0, 1]
pub(crate) fn check_unit_interval(section: &str, field: &str, value: f64) -> Result<(), EvolutionError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(EvolutionError::Configuration(format!(
            "{}.{} must be between 0 and 1, got {}",
            section, field, value
        )));
    }
    Ok(())
}

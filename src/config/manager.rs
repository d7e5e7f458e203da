use super::{
    diversity::DiversityConfig,
    evolution::EvolutionConfig,
    traits::ConfigSection,
    trigger::TriggerConfig,
};
use crate::error::EvolutionError;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub trigger: TriggerConfig,
    pub diversity: DiversityConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), EvolutionError> {
        self.evolution.validate()?;
        self.trigger.validate()?;
        self.diversity.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EvolutionError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EvolutionError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| EvolutionError::Configuration(format!("Failed to parse config: {}", e)))?;

        self.replace(config)
    }

    /// Layer an optional TOML file under environment overrides such as
    /// `TRADEVOLVE__EVOLUTION__ELITE_RATIO=0.2`.
    pub fn load_layered<P: AsRef<Path>>(&self, path: Option<P>, env_prefix: &str) -> Result<(), EvolutionError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path.as_ref()).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        log::info!(
            "Loaded layered configuration ({} / {} / {} sections)",
            EvolutionConfig::section_name(),
            TriggerConfig::section_name(),
            DiversityConfig::section_name()
        );
        self.replace(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EvolutionError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| EvolutionError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| EvolutionError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        match self.config.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Apply `f` to a copy and commit it only if the result validates
    pub fn update<F>(&self, f: F) -> Result<(), EvolutionError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.get();
        f(&mut candidate);
        self.replace(candidate)
    }

    fn replace(&self, config: AppConfig) -> Result<(), EvolutionError> {
        config.validate()?;
        let mut guard = self
            .config
            .write()
            .map_err(|_| EvolutionError::Configuration("Config lock poisoned".to_string()))?;
        *guard = config;
        Ok(())
    }
}

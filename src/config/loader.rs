//! Configuration Loader
//!
//! Environment-aware configuration loading. Handles environment detection, file
//! discovery and layering of environment variable overrides on top of defaults.

use super::error::{ConfigResult, ConfigurationError};
use super::WellnessConfig;
use config::{Config, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_STEM: &str = "wellness";
const ENV_PREFIX: &str = "WELLNESS";

/// Loaded configuration together with where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: WellnessConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(|| PathBuf::from("config"));

        debug!(
            environment = %environment,
            config_directory = %config_directory.display(),
            "Loading configuration"
        );

        let config = Self::build_layered_config(&config_directory, environment)?;
        config.validate()?;

        info!(
            environment = %environment,
            backend = %config.backend.base_url,
            enrichment_enabled = config.enrichment.enabled,
            failure_policy = %config.enrichment.failure_policy,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Wrap an already-built configuration, validating it first
    pub fn from_config(config: WellnessConfig, environment: &str) -> ConfigResult<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory: PathBuf::from("config"),
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &WellnessConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    fn build_layered_config(directory: &Path, environment: &str) -> ConfigResult<WellnessConfig> {
        let base_file = directory.join(format!("{CONFIG_FILE_STEM}.toml"));
        let env_file = directory.join(format!("{CONFIG_FILE_STEM}.{environment}.toml"));

        debug!(
            base_file = %base_file.display(),
            env_file = %env_file.display(),
            "Resolving configuration sources"
        );

        // Missing files fall back to the serde defaults on WellnessConfig
        let layered = Config::builder()
            .add_source(File::new(&base_file.to_string_lossy(), FileFormat::Toml).required(false))
            .add_source(File::new(&env_file.to_string_lossy(), FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigurationError::load_failed(environment, e))?;

        layered
            .try_deserialize::<WellnessConfig>()
            .map_err(|e| ConfigurationError::load_failed(environment, e))
    }

    /// Detect the current environment from environment variables
    pub fn detect_environment() -> String {
        env::var("WELLNESS_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }
}

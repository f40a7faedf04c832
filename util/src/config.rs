//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::sync::{OnceLock, RwLock, RwLockReadGuard};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    /// Grading configuration file used when `checker` is started without an argument.
    pub grading_config: String,
    /// Fallback results directory when the grading configuration names none.
    pub results_dir: String,
    pub simulation_output_dir: String,
    pub simulation_seed: u64,
    /// Optional CSV medication catalog; the built-in catalog is used when unset.
    pub medication_catalog: Option<String>,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every value has a default, so a bare environment yields a usable config.
    /// Numeric values that fail to parse fall back to their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "sheet-checker".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "checker.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "true".into()) == "true",
            grading_config: env::var("GRADING_CONFIG")
                .unwrap_or_else(|_| "grading.json".into()),
            results_dir: env::var("RESULTS_DIR").unwrap_or_else(|_| "results".into()),
            simulation_output_dir: env::var("SIMULATION_OUTPUT_DIR")
                .unwrap_or_else(|_| "simulated".into()),
            simulation_seed: env::var("SIMULATION_SEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8114),
            medication_catalog: env::var("MEDICATION_CATALOG")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        }
    }

    /// Returns a shared reference to the global configuration.
    pub fn global() -> RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_results_dir(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.results_dir = value.into());
    }

    pub fn set_simulation_seed(value: u64) {
        AppConfig::set_field(|cfg| cfg.simulation_seed = value);
    }
}

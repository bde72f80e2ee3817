//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{CountryRules, EngineSettings, LevySchedule, PayrollConfig};

/// Loads and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/payroll/
/// ├── engine.yaml        # Expatriate policy, fallback rate, unit defaults
/// ├── levy.yaml          # Annual bracket levy schedule
/// └── countries/
///     ├── ug.yaml        # One statutory rule table per country
///     └── ke.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll").unwrap();
/// let uganda = loader.config().country("UG").unwrap();
/// println!("{} has {} rules", uganda.name, uganda.rules.len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if any required file is missing, contains invalid
    /// YAML, or fails rule validation.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let levy = Self::load_yaml::<LevySchedule>(&path.join("levy.yaml"))?;
        let countries = Self::load_countries(&path.join("countries"))?;

        debug!(
            path = %path.display(),
            countries = countries.len(),
            "Loaded payroll configuration"
        );

        let config = PayrollConfig::new(settings, countries, levy)?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every country table from the countries directory.
    fn load_countries(countries_dir: &Path) -> EngineResult<Vec<CountryRules>> {
        let dir_str = countries_dir.display().to_string();

        let entries = fs::read_dir(countries_dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut countries = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                countries.push(Self::load_yaml::<CountryRules>(&path)?);
            }
        }

        // An empty directory is valid: every employee then gets an empty rule set.
        Ok(countries)
    }

    /// Returns the loaded configuration snapshot.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Consumes the loader, returning the snapshot.
    pub fn into_config(self) -> PayrollConfig {
        self.config
    }
}

//! Configuration loading and management for the payroll engine.
//!
//! This module provides functionality to load engine settings, country
//! statutory rule tables and the bracket levy schedule from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/payroll").unwrap();
//! println!("Levy: {}", loader.config().levy().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CountryRules, DeductionRule, DefaultUnits, EngineSettings, ExpatriatePolicy, LevyBracket,
    LevySchedule, PayrollConfig, RuleBasis, RuleBracket,
};

#[cfg(test)]
pub(crate) mod fixtures;

//! Application state for the payroll engine API.

use std::sync::Arc;

use crate::config::{ConfigLoader, PayrollConfig};

/// Shared application state.
///
/// Holds the configuration snapshot every handler calculates against.
/// Reloading rules means building a new state.
#[derive(Clone)]
pub struct AppState {
    loader: Arc<ConfigLoader>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    pub fn new(loader: ConfigLoader) -> Self {
        Self {
            loader: Arc::new(loader),
        }
    }

    /// Returns the configuration snapshot.
    pub fn config(&self) -> &PayrollConfig {
        self.loader.config()
    }
}

//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading rule tables,
//! computing pay items and operating on pay runs.
//!
//! Most input problems (missing rates, unknown countries, unknown pay types)
//! are not errors at all: the engine substitutes a default and records an
//! audit warning, because payroll must produce a number for every employee.

use thiserror::Error;

use crate::models::PayRunStatus;

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A deduction rule or levy table failed validation.
    #[error("Invalid rule '{rule}': {message}")]
    InvalidRule {
        /// The name of the offending rule or table.
        rule: String,
        /// A description of what made the rule invalid.
        message: String,
    },

    /// A computation step failed (typically a decimal overflow).
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// The requested installment count is outside the supported range.
    #[error("Invalid installment month count {months}: must be between 1 and 3")]
    InvalidInstallmentMonths {
        /// The rejected month count.
        months: u32,
    },

    /// A pay run status change is not permitted by the lifecycle.
    #[error("Invalid pay run status transition from {from} to {to}")]
    InvalidStatusTransition {
        /// The current status.
        from: PayRunStatus,
        /// The requested status.
        to: PayRunStatus,
    },

    /// The pay run can no longer be edited.
    #[error("Pay run is {status} and can no longer be modified")]
    PayRunLocked {
        /// The status that locks the run.
        status: PayRunStatus,
    },

    /// No pay item exists for the employee in this run.
    #[error("Pay item not found for employee: {employee_id}")]
    PayItemNotFound {
        /// The employee ID that was looked up.
        employee_id: String,
    },

    /// A custom adjustment was rejected.
    #[error("Invalid custom adjustment '{name}': {message}")]
    InvalidAdjustment {
        /// The adjustment name.
        name: String,
        /// Why the adjustment was rejected.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// Builds a [`EngineError::CalculationError`] for an overflowing operation.
pub(crate) fn overflow(context: &str) -> EngineError {
    EngineError::CalculationError {
        message: format!("arithmetic overflow while computing {}", context),
    }
}

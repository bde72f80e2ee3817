//! Pay period model.
//!
//! This module contains the [`PayPeriod`] type that bounds a pay run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Represents a pay period with its inclusive date range.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let pay_period = PayPeriod {
///     start_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2026, 7, 31).unwrap(),
/// };
///
/// assert_eq!(pay_period.label(), "2026-07");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// Returns a year-month label for the period's start (e.g., "2026-07").
    pub fn label(&self) -> String {
        self.start_date.format("%Y-%m").to_string()
    }
}

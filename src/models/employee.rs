//! Employee model and related types.
//!
//! This module defines the Employee struct together with the PayType and
//! EmployeeType enums consumed by the pay calculation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How an employee's base pay is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayType {
    /// Paid `pay_rate` per hour worked.
    Hourly,
    /// Paid `pay_rate` per piece completed.
    PieceRate,
    /// Paid `pay_rate` per period.
    Salary,
    /// Any pay type the engine does not know; treated like a salary.
    #[serde(other)]
    Unrecognized,
}

/// The tax classification of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeType {
    /// Subject to the country's statutory rule table.
    Local,
    /// Subject to the flat expatriate rate instead of the country table.
    Expatriate,
}

/// Represents an employee included in payroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// How base pay is derived.
    pub pay_type: PayType,
    /// Rate per hour, per piece or per period. Absent means zero.
    #[serde(default)]
    pub pay_rate: Option<Decimal>,
    /// ISO country code keying the statutory rule table (e.g., "UG").
    pub country: String,
    /// Local or expatriate classification.
    pub employee_type: EmployeeType,
    /// Standing hours worked per period, used when the pay item has none.
    #[serde(default)]
    pub hours_worked: Option<Decimal>,
    /// Standing pieces completed per period, used when the pay item has none.
    #[serde(default)]
    pub pieces_completed: Option<Decimal>,
    /// Inactive employees are skipped when a pay run is generated.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Employee {
    /// Returns true if the employee is taxed under the expatriate regime.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{Employee, EmployeeType, PayType};
    ///
    /// let employee = Employee {
    ///     id: "emp_001".to_string(),
    ///     name: "A. Okello".to_string(),
    ///     pay_type: PayType::Salary,
    ///     pay_rate: None,
    ///     country: "UG".to_string(),
    ///     employee_type: EmployeeType::Expatriate,
    ///     hours_worked: None,
    ///     pieces_completed: None,
    ///     active: true,
    /// };
    /// assert!(employee.is_expatriate());
    /// ```
    pub fn is_expatriate(&self) -> bool {
        self.employee_type == EmployeeType::Expatriate
    }
}

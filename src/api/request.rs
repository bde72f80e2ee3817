//! Request types for the payroll engine API.
//!
//! This module defines the JSON request structures for the `/calculate`,
//! `/installments/preview` and `/pay-runs` endpoints.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{InstallmentScope, LevyBasis, LevyMethod};
use crate::models::{CustomAdjustment, Employee, EmployeeType, PayPeriod, PayType};

/// Request body for the `/calculate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The employee information.
    pub employee: EmployeeRequest,
    /// Ad-hoc items for the period.
    #[serde(default)]
    pub custom_adjustments: Vec<CustomAdjustment>,
    /// Manually entered benefit deductions.
    #[serde(default)]
    pub benefit_deductions: Decimal,
}

/// Employee information in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRequest {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// How the employee is paid.
    pub pay_type: PayType,
    /// Rate per hour, per piece, or per period.
    #[serde(default)]
    pub pay_rate: Option<Decimal>,
    /// Country code selecting the statutory rule table.
    pub country: String,
    /// Local or expatriate classification.
    pub employee_type: EmployeeType,
    /// Hours worked this period.
    #[serde(default)]
    pub hours_worked: Option<Decimal>,
    /// Pieces completed this period.
    #[serde(default)]
    pub pieces_completed: Option<Decimal>,
    /// Whether the employee is included in generated pay runs.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl From<EmployeeRequest> for Employee {
    fn from(req: EmployeeRequest) -> Self {
        Employee {
            id: req.id,
            name: req.name,
            pay_type: req.pay_type,
            pay_rate: req.pay_rate,
            country: req.country,
            employee_type: req.employee_type,
            hours_worked: req.hours_worked,
            pieces_completed: req.pieces_completed,
            active: req.active,
        }
    }
}

/// Pay period information in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPeriodRequest {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
}

impl From<PayPeriodRequest> for PayPeriod {
    fn from(req: PayPeriodRequest) -> Self {
        PayPeriod {
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

/// Request body for the `/installments/preview` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentPreviewRequest {
    /// Employees and the basis their levy is looked up by.
    #[serde(default)]
    pub candidates: Vec<LevyBasis>,
    /// Employees whose basis is their calculated gross pay.
    #[serde(default)]
    pub employees: Vec<EmployeeRequest>,
    /// How annual liability is determined.
    pub method: LevyMethod,
    /// Number of installments (1 to 3).
    pub months: u32,
    /// Which candidates to plan for; all of them when absent.
    #[serde(default)]
    pub scope: InstallmentScope,
}

/// Request body for the `/pay-runs` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayRunRequest {
    /// Display name for the run.
    pub name: String,
    /// The period the run pays.
    pub pay_period: PayPeriodRequest,
    /// Employees to include; inactive ones are skipped.
    pub employees: Vec<EmployeeRequest>,
}

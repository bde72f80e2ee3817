//! Calculation result models for the payroll engine.
//!
//! This module contains the [`PayCalculation`] type and its associated structures
//! that capture all outputs of one employee's pay calculation, including the
//! statutory breakdown, custom items and the audit trace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CustomAdjustment;

/// One statutory rule's contribution to a pay calculation.
///
/// # Example
///
/// ```
/// use payroll_engine::models::DeductionLine;
/// use rust_decimal::Decimal;
///
/// let line = DeductionLine {
///     rule_name: "NSSF".to_string(),
///     source: "UG".to_string(),
///     basis_amount: Decimal::new(60000, 0),
///     percentage: Some(Decimal::new(5, 0)),
///     employee_amount: Decimal::new(3000, 0),
///     employer_amount: Decimal::new(6000, 0),
///     capped: false,
/// };
/// assert_eq!(line.employee_amount + line.employer_amount, Decimal::new(9000, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// The name of the rule (e.g., "PAYE", "NSSF Employer").
    pub rule_name: String,
    /// Where the rule came from: a country code or "expatriate".
    pub source: String,
    /// The gross amount the rule was evaluated against.
    pub basis_amount: Decimal,
    /// The flat percentage applied, when the rule is percentage-based.
    pub percentage: Option<Decimal>,
    /// The amount withheld from the employee.
    pub employee_amount: Decimal,
    /// The amount borne by the employer.
    pub employer_amount: Decimal,
    /// Whether the employee amount was limited by the rule cap.
    pub capped: bool,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The identifier of the step or rule (e.g., "base_pay", "statutory:PAYE").
    pub rule_id: String,
    /// The human-readable name of the step.
    pub rule_name: String,
    /// Where the applied data came from (country code, "custom", "engine").
    pub source: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings record substituted defaults and recovered failures; they never
/// prevent a pay item from receiving a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning (e.g., "UNKNOWN_COUNTRY").
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level ("low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(code: &str, message: impl Into<String>, severity: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: severity.to_string(),
        }
    }
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// The full itemized outcome of one employee's pay calculation.
///
/// The identities `total_deductions = tax_deduction + benefit_deductions +
/// custom_deductions` and `net_pay = gross_pay + non_gross_allowances -
/// total_deductions` always hold, including for fallback estimates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayCalculation {
    /// The employee this calculation is for.
    pub employee_id: String,
    /// Pay derived from pay type, rate and units before any adjustment.
    pub base_gross_pay: Decimal,
    /// Sum of benefit-type custom adjustments.
    pub gross_affecting_additions: Decimal,
    /// `base_gross_pay + gross_affecting_additions`.
    pub gross_pay: Decimal,
    /// Employee-side statutory deductions.
    pub tax_deduction: Decimal,
    /// Manually entered benefit deductions.
    pub benefit_deductions: Decimal,
    /// Sum of deduction-type custom adjustments.
    pub custom_deductions: Decimal,
    /// Sum of allowance-type custom adjustments.
    pub non_gross_allowances: Decimal,
    /// All amounts withheld from the employee.
    pub total_deductions: Decimal,
    /// The amount paid to the employee.
    pub net_pay: Decimal,
    /// Employer-borne statutory amounts; never part of deductions.
    pub employer_contributions: Decimal,
    /// One line per statutory rule applied.
    pub standard_deductions_breakdown: Vec<DeductionLine>,
    /// The custom adjustments that fed this calculation.
    pub custom_breakdown: Vec<CustomAdjustment>,
    /// True when the figures are a simplified fallback estimate.
    pub estimated: bool,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

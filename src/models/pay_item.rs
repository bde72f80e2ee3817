//! Pay item model.
//!
//! A [`PayItem`] is the per-employee, per-run record: the worked units and
//! manual inputs that feed the calculation plus the persisted figures that
//! come out of it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CustomAdjustment, Employee, PayCalculation};

/// Where a pay item is in its calculation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayItemStatus {
    /// Created but not yet calculated.
    Pending,
    /// Figures come from the full calculation.
    Calculated,
    /// The full calculation failed; figures are a simplified estimate.
    Estimated,
}

/// One employee's record within a pay run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayItem {
    /// Unique identifier for this pay item.
    pub id: Uuid,
    /// Snapshot of the employee taken when the run was generated.
    pub employee: Employee,
    /// Hours worked this period; overrides the employee's standing value.
    #[serde(default)]
    pub hours_worked: Option<Decimal>,
    /// Pieces completed this period; overrides the employee's standing value.
    #[serde(default)]
    pub pieces_completed: Option<Decimal>,
    /// Gross pay including benefit-type adjustments.
    pub gross_pay: Decimal,
    /// Employee-side statutory deductions.
    pub tax_deduction: Decimal,
    /// Manually entered benefit deductions.
    pub benefit_deductions: Decimal,
    /// All amounts withheld from the employee.
    pub total_deductions: Decimal,
    /// The amount paid to the employee.
    pub net_pay: Decimal,
    /// Employer-borne statutory amounts.
    pub employer_contributions: Decimal,
    /// Calculation status.
    pub status: PayItemStatus,
    /// Ad-hoc items for this period.
    #[serde(default)]
    pub custom_adjustments: Vec<CustomAdjustment>,
    /// The full breakdown of the most recent calculation.
    #[serde(default)]
    pub breakdown: Option<PayCalculation>,
}

impl PayItem {
    /// Creates a pending pay item for an employee with all figures at zero.
    pub fn new(employee: Employee) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee,
            hours_worked: None,
            pieces_completed: None,
            gross_pay: Decimal::ZERO,
            tax_deduction: Decimal::ZERO,
            benefit_deductions: Decimal::ZERO,
            total_deductions: Decimal::ZERO,
            net_pay: Decimal::ZERO,
            employer_contributions: Decimal::ZERO,
            status: PayItemStatus::Pending,
            custom_adjustments: Vec::new(),
            breakdown: None,
        }
    }

    /// The ID of the employee this item belongs to.
    pub fn employee_id(&self) -> &str {
        &self.employee.id
    }

    /// Hours worked, falling back to the employee's standing value.
    pub fn effective_hours(&self) -> Option<Decimal> {
        self.hours_worked.or(self.employee.hours_worked)
    }

    /// Pieces completed, falling back to the employee's standing value.
    pub fn effective_pieces(&self) -> Option<Decimal> {
        self.pieces_completed.or(self.employee.pieces_completed)
    }

    /// Persists a finished calculation onto this item in one step.
    pub fn apply(&mut self, calculation: PayCalculation) {
        self.gross_pay = calculation.gross_pay;
        self.tax_deduction = calculation.tax_deduction;
        self.total_deductions = calculation.total_deductions;
        self.net_pay = calculation.net_pay;
        self.employer_contributions = calculation.employer_contributions;
        self.status = if calculation.estimated {
            PayItemStatus::Estimated
        } else {
            PayItemStatus::Calculated
        };
        self.breakdown = Some(calculation);
    }

    /// The recurring subset of this item's custom adjustments.
    pub fn recurring_adjustments(&self) -> Vec<CustomAdjustment> {
        self.custom_adjustments
            .iter()
            .filter(|a| a.recurring)
            .cloned()
            .collect()
    }
}

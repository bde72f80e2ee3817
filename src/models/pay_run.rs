//! Pay run model and status lifecycle.
//!
//! A [`PayRun`] groups the pay items of one period with their aggregate
//! totals. Its status moves `draft → pending → approved → paid`; a pending
//! run may be sent back to draft. Only draft and pending runs are editable.

use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::{CustomAdjustment, PayItem, PayPeriod};

/// Lifecycle status of a pay run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayRunStatus {
    /// Being prepared; freely editable.
    Draft,
    /// Submitted for approval; still editable.
    Pending,
    /// Approved for payment; locked.
    Approved,
    /// Paid out; locked.
    Paid,
}

impl PayRunStatus {
    /// Returns the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Paid => "paid",
        }
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: PayRunStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Pending)
                | (Self::Pending, Self::Draft)
                | (Self::Pending, Self::Approved)
                | (Self::Approved, Self::Paid)
        )
    }

    /// Whether pay items may still be mutated in this status.
    pub fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::Pending)
    }
}

impl fmt::Display for PayRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate totals across every pay item of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayRunTotals {
    /// Number of pay items summed.
    pub employee_count: usize,
    /// Sum of gross pay.
    pub total_gross_pay: Decimal,
    /// Sum of total deductions.
    pub total_deductions: Decimal,
    /// Sum of net pay.
    pub total_net_pay: Decimal,
    /// Sum of employer contributions.
    pub total_employer_contributions: Decimal,
}

/// A batch of pay items for one pay group and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayRun {
    /// Unique identifier for the run.
    pub id: Uuid,
    /// Display name (e.g., "July 2026 monthly").
    pub name: String,
    /// The period this run pays.
    pub period: PayPeriod,
    /// Lifecycle status.
    pub status: PayRunStatus,
    /// One item per included employee.
    pub items: Vec<PayItem>,
    /// Totals as of the last aggregation.
    pub totals: PayRunTotals,
}

impl PayRun {
    /// Creates an empty draft run.
    pub fn new(name: impl Into<String>, period: PayPeriod) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            period,
            status: PayRunStatus::Draft,
            items: Vec::new(),
            totals: PayRunTotals::default(),
        }
    }

    /// Fails with [`EngineError::PayRunLocked`] unless the run is editable.
    pub fn ensure_editable(&self) -> EngineResult<()> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(EngineError::PayRunLocked {
                status: self.status,
            })
        }
    }

    /// Moves the run to `next` if the lifecycle allows it.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{PayPeriod, PayRun, PayRunStatus};
    /// use chrono::NaiveDate;
    ///
    /// let mut run = PayRun::new("July", PayPeriod {
    ///     start_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
    ///     end_date: NaiveDate::from_ymd_opt(2026, 7, 31).unwrap(),
    /// });
    /// run.transition_to(PayRunStatus::Pending).unwrap();
    /// run.transition_to(PayRunStatus::Approved).unwrap();
    /// assert!(run.transition_to(PayRunStatus::Draft).is_err());
    /// ```
    pub fn transition_to(&mut self, next: PayRunStatus) -> EngineResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Finds the pay item for an employee.
    pub fn item(&self, employee_id: &str) -> Option<&PayItem> {
        self.items.iter().find(|i| i.employee_id() == employee_id)
    }

    /// Finds the pay item for an employee, mutably.
    pub fn item_mut(&mut self, employee_id: &str) -> EngineResult<&mut PayItem> {
        self.items
            .iter_mut()
            .find(|i| i.employee_id() == employee_id)
            .ok_or_else(|| EngineError::PayItemNotFound {
                employee_id: employee_id.to_string(),
            })
    }

    /// Recurring adjustments keyed by employee ID, for carrying into the next run.
    pub fn recurring_adjustments(&self) -> HashMap<String, Vec<CustomAdjustment>> {
        self.items
            .iter()
            .map(|i| (i.employee_id().to_string(), i.recurring_adjustments()))
            .filter(|(_, adjustments)| !adjustments.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdjustmentKind, Employee, EmployeeType, PayType};
    use chrono::NaiveDate;

    fn period() -> PayPeriod {
        PayPeriod {
            start_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 7, 31).unwrap(),
        }
    }

    fn employee(id: &str) -> Employee {
        Employee {
            id: id.to_string(),
            name: String::new(),
            pay_type: PayType::Salary,
            pay_rate: Some(Decimal::new(500000, 0)),
            country: "UG".to_string(),
            employee_type: EmployeeType::Local,
            hours_worked: None,
            pieces_completed: None,
            active: true,
        }
    }

    #[test]
    fn test_new_run_is_empty_draft() {
        let run = PayRun::new("July", period());
        assert_eq!(run.status, PayRunStatus::Draft);
        assert!(run.items.is_empty());
        assert_eq!(run.totals, PayRunTotals::default());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut run = PayRun::new("July", period());
        run.transition_to(PayRunStatus::Pending).unwrap();
        run.transition_to(PayRunStatus::Approved).unwrap();
        run.transition_to(PayRunStatus::Paid).unwrap();
        assert_eq!(run.status, PayRunStatus::Paid);
    }

    #[test]
    fn test_pending_can_be_sent_back_to_draft() {
        let mut run = PayRun::new("July", period());
        run.transition_to(PayRunStatus::Pending).unwrap();
        run.transition_to(PayRunStatus::Draft).unwrap();
        assert_eq!(run.status, PayRunStatus::Draft);
    }

    #[test]
    fn test_skipping_approval_is_rejected() {
        let mut run = PayRun::new("July", period());
        let result = run.transition_to(PayRunStatus::Paid);

        match result {
            Err(EngineError::InvalidStatusTransition { from, to }) => {
                assert_eq!(from, PayRunStatus::Draft);
                assert_eq!(to, PayRunStatus::Paid);
            }
            other => panic!("Expected InvalidStatusTransition, got {:?}", other),
        }
        assert_eq!(run.status, PayRunStatus::Draft);
    }

    #[test]
    fn test_approved_run_is_locked() {
        let mut run = PayRun::new("July", period());
        assert!(run.ensure_editable().is_ok());
        run.transition_to(PayRunStatus::Pending).unwrap();
        assert!(run.ensure_editable().is_ok());
        run.transition_to(PayRunStatus::Approved).unwrap();

        match run.ensure_editable() {
            Err(EngineError::PayRunLocked { status }) => assert_eq!(status, PayRunStatus::Approved),
            other => panic!("Expected PayRunLocked, got {:?}", other),
        }
    }

    #[test]
    fn test_item_mut_unknown_employee_errors() {
        let mut run = PayRun::new("July", period());
        run.items.push(PayItem::new(employee("emp_001")));

        assert!(run.item_mut("emp_001").is_ok());
        match run.item_mut("emp_999") {
            Err(EngineError::PayItemNotFound { employee_id }) => assert_eq!(employee_id, "emp_999"),
            other => panic!("Expected PayItemNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_recurring_adjustments_keyed_by_employee() {
        let mut run = PayRun::new("July", period());
        let mut with_levy = PayItem::new(employee("emp_001"));
        with_levy.custom_adjustments.push(CustomAdjustment::recurring(
            "Local Service Tax",
            Decimal::new(3333, 0),
            AdjustmentKind::Deduction,
        ));
        run.items.push(with_levy);
        run.items.push(PayItem::new(employee("emp_002")));

        let recurring = run.recurring_adjustments();
        assert_eq!(recurring.len(), 1);
        assert_eq!(recurring["emp_001"][0].name, "Local Service Tax");
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&PayRunStatus::Approved).unwrap(),
            "\"approved\""
        );
        assert_eq!(PayRunStatus::Pending.to_string(), "pending");
    }
}

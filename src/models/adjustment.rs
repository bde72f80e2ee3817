//! Custom adjustment model.
//!
//! Custom adjustments are ad-hoc per-period items attached to a pay item.
//! Their [`AdjustmentKind`] decides whether they move gross pay, net pay
//! only, or total deductions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The classification tag of a custom adjustment.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AdjustmentKind;
///
/// assert!(AdjustmentKind::Benefit.affects_gross());
/// assert!(AdjustmentKind::Allowance.affects_net_only());
/// assert!(AdjustmentKind::Deduction.is_deduction());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Withheld from pay; summed into total deductions.
    Deduction,
    /// Part of gross pay; seen by percentage-based statutory rules.
    Benefit,
    /// Paid on top of net pay; never seen by statutory rules.
    Allowance,
}

impl AdjustmentKind {
    /// True when the amount is added to gross pay.
    pub fn affects_gross(self) -> bool {
        matches!(self, AdjustmentKind::Benefit)
    }

    /// True when the amount is added after deductions are computed.
    pub fn affects_net_only(self) -> bool {
        matches!(self, AdjustmentKind::Allowance)
    }

    /// True when the amount is summed into total deductions.
    pub fn is_deduction(self) -> bool {
        matches!(self, AdjustmentKind::Deduction)
    }
}

/// A named ad-hoc amount owned by a pay item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAdjustment {
    /// Display name, unique within a pay item by convention.
    pub name: String,
    /// The amount for this period.
    pub amount: Decimal,
    /// How the amount affects pay.
    #[serde(rename = "type")]
    pub kind: AdjustmentKind,
    /// Recurring adjustments are carried into the next generated pay run.
    #[serde(default)]
    pub recurring: bool,
}

impl CustomAdjustment {
    /// Creates a one-off adjustment.
    pub fn new(name: impl Into<String>, amount: Decimal, kind: AdjustmentKind) -> Self {
        Self {
            name: name.into(),
            amount,
            kind,
            recurring: false,
        }
    }

    /// Creates an adjustment that repeats every period.
    pub fn recurring(name: impl Into<String>, amount: Decimal, kind: AdjustmentKind) -> Self {
        Self {
            recurring: true,
            ..Self::new(name, amount, kind)
        }
    }
}

//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod adjustment;
mod calculation_result;
mod employee;
mod pay_item;
mod pay_period;
mod pay_run;

pub use adjustment::{AdjustmentKind, CustomAdjustment};
pub use calculation_result::{AuditStep, AuditTrace, AuditWarning, DeductionLine, PayCalculation};
pub use employee::{Employee, EmployeeType, PayType};
pub use pay_item::{PayItem, PayItemStatus};
pub use pay_period::PayPeriod;
pub use pay_run::{PayRun, PayRunStatus, PayRunTotals};

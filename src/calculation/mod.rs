//! Calculation logic for the payroll engine.
//!
//! This module contains the computation steps for one employee (base pay
//! resolution, statutory deduction rules, custom adjustment pools), their
//! composition into a full pay calculation, bracket levy installment
//! planning, and the pay run operations that recalculate items and
//! aggregate totals.

mod base_pay;
mod custom_adjustments;
mod deduction_rules;
mod installments;
mod pay_item;
mod pay_run;

pub use base_pay::{BasePayResult, resolve_base_pay};
pub use custom_adjustments::{
    GrossAdditionsResult, NetAdjustmentsResult, aggregate_gross_additions,
    aggregate_net_adjustments, validate_adjustment, validate_benefit_deductions,
};
pub use deduction_rules::{
    DeductionRegime, EXPATRIATE_SOURCE, StatutoryResult, apply_statutory_rules, evaluate_rule,
    resolve_regime,
};
pub use installments::{
    InstallmentPlan, InstallmentScope, LevyBasis, LevyMethod, MAX_INSTALLMENT_MONTHS,
    MIN_INSTALLMENT_MONTHS, annual_liability, apportion, plan_installments,
};
pub use pay_item::{calculate_pay, calculate_pay_item, estimate_pay};
pub use pay_run::{
    RecalculationReport, add_custom_adjustment, aggregate_pay_run, bulk_add_custom_adjustment,
    commit_installments, employee_levy_candidates, generate_pay_run, levy_candidates,
    plan_run_installments, recalculate_pay_item, recalculate_pay_run, refresh_totals,
    remove_custom_adjustment, set_benefit_deductions, set_worked_units,
};

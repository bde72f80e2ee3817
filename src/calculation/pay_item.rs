//! Per-employee pay calculation.
//!
//! [`calculate_pay`] composes the base pay resolver, the custom adjustment
//! pools and the statutory rule engine in a fixed order:
//!
//! 1. base gross pay
//! 2. gross-affecting additions (benefit items)
//! 3. gross pay
//! 4. statutory deductions and employer contributions on gross pay
//! 5. custom deductions and non-gross allowances
//! 6. total deductions
//! 7. net pay
//!
//! [`calculate_pay_item`] wraps it for pay runs: a failed calculation is
//! replaced by a flat-rate estimate so every item always receives figures.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult, overflow};
use crate::models::{
    AdjustmentKind, AuditStep, AuditTrace, AuditWarning, CustomAdjustment, Employee, PayCalculation,
    PayItem,
};

use super::base_pay::resolve_base_pay;
use super::custom_adjustments::{aggregate_gross_additions, aggregate_net_adjustments};
use super::deduction_rules::{apply_statutory_rules, resolve_regime, round};

/// Computes one employee's full pay breakdown.
///
/// `hours_worked` and `pieces_completed` are the period's units; pass the
/// employee's own values when no pay item overrides them.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] when any amount overflows.
/// Missing inputs and unknown countries are recorded as audit warnings instead.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_pay;
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::{AdjustmentKind, CustomAdjustment, Employee, EmployeeType, PayType};
/// use rust_decimal::Decimal;
///
/// let loader = ConfigLoader::load("./config/payroll").unwrap();
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     name: "Grace Namuli".to_string(),
///     pay_type: PayType::Salary,
///     pay_rate: Some(Decimal::new(1_000_000, 0)),
///     country: "UG".to_string(),
///     employee_type: EmployeeType::Expatriate,
///     hours_worked: None,
///     pieces_completed: None,
///     active: true,
/// };
///
/// let result = calculate_pay(&employee, None, None, &[], Decimal::ZERO, loader.config()).unwrap();
/// assert_eq!(result.tax_deduction, Decimal::new(150_000, 0));
/// assert_eq!(result.employer_contributions, Decimal::ZERO);
/// ```
pub fn calculate_pay(
    employee: &Employee,
    hours_worked: Option<Decimal>,
    pieces_completed: Option<Decimal>,
    adjustments: &[CustomAdjustment],
    benefit_deductions: Decimal,
    config: &PayrollConfig,
) -> EngineResult<PayCalculation> {
    let settings = config.settings();
    let mut trace = AuditTrace::default();
    let mut step_number = 1;

    let base = resolve_base_pay(
        employee.pay_type,
        employee.pay_rate,
        hours_worked,
        pieces_completed,
        &settings.default_units,
        step_number,
    )?;
    trace.steps.push(base.audit_step);
    trace.warnings.extend(base.warnings);
    step_number += 1;

    let additions = aggregate_gross_additions(adjustments, step_number)?;
    trace.steps.push(additions.audit_step);
    step_number += 1;

    let gross_pay = base
        .base_gross_pay
        .checked_add(additions.total)
        .ok_or_else(|| overflow("gross pay"))?;

    let (regime, country_warning) = resolve_regime(employee, config);
    if let Some(warning) = country_warning {
        warn!(
            employee_id = %employee.id,
            country = %employee.country,
            "No statutory rules for country; continuing without statutory deductions"
        );
        trace.warnings.push(warning);
    }

    let statutory = apply_statutory_rules(regime, gross_pay, settings.currency_scale, step_number)?;
    step_number += statutory.audit_steps.len() as u32;
    trace.steps.extend(statutory.audit_steps);

    let net_items = aggregate_net_adjustments(adjustments, step_number)?;
    trace.steps.push(net_items.audit_step);
    step_number += 1;

    let total_deductions = statutory
        .tax_deduction
        .checked_add(benefit_deductions)
        .and_then(|sum| sum.checked_add(net_items.custom_deductions))
        .ok_or_else(|| overflow("total deductions"))?;
    let net_pay = gross_pay
        .checked_add(net_items.non_gross_allowances)
        .and_then(|sum| sum.checked_sub(total_deductions))
        .ok_or_else(|| overflow("net pay"))?;

    trace.steps.push(AuditStep {
        step_number,
        rule_id: "totals".to_string(),
        rule_name: "Deductions and Net Pay".to_string(),
        source: "engine".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.normalize().to_string(),
            "statutory_deductions": statutory.tax_deduction.normalize().to_string(),
            "benefit_deductions": benefit_deductions.normalize().to_string(),
            "custom_deductions": net_items.custom_deductions.normalize().to_string(),
            "non_gross_allowances": net_items.non_gross_allowances.normalize().to_string(),
        }),
        output: serde_json::json!({
            "total_deductions": total_deductions.normalize().to_string(),
            "net_pay": net_pay.normalize().to_string(),
        }),
        reasoning: format!(
            "Net pay: {} + {} - {} = {}",
            gross_pay.normalize(),
            net_items.non_gross_allowances.normalize(),
            total_deductions.normalize(),
            net_pay.normalize()
        ),
    });

    debug!(
        employee_id = %employee.id,
        gross_pay = %gross_pay,
        total_deductions = %total_deductions,
        net_pay = %net_pay,
        "Calculated pay"
    );

    Ok(PayCalculation {
        employee_id: employee.id.clone(),
        base_gross_pay: base.base_gross_pay,
        gross_affecting_additions: additions.total,
        gross_pay,
        tax_deduction: statutory.tax_deduction,
        benefit_deductions,
        custom_deductions: net_items.custom_deductions,
        non_gross_allowances: net_items.non_gross_allowances,
        total_deductions,
        net_pay,
        employer_contributions: statutory.employer_contributions,
        standard_deductions_breakdown: statutory.lines,
        custom_breakdown: adjustments.to_vec(),
        estimated: false,
        audit_trace: trace,
    })
}

/// Calculates a pay item's figures, substituting an estimate on failure.
///
/// Never fails, so one employee's bad data cannot abort a batch.
pub fn calculate_pay_item(item: &PayItem, config: &PayrollConfig) -> PayCalculation {
    let hours = item.effective_hours();
    let pieces = item.effective_pieces();

    calculate_pay(
        &item.employee,
        hours,
        pieces,
        &item.custom_adjustments,
        item.benefit_deductions,
        config,
    )
    .unwrap_or_else(|error| {
        estimate_pay(
            &item.employee,
            hours,
            pieces,
            &item.custom_adjustments,
            item.benefit_deductions,
            config,
            &error,
        )
    })
}

/// Builds a simplified estimate after `calculate_pay` failed with `error`.
///
/// Statutory deductions are replaced by the configured fallback percentage
/// of gross pay with no employer side. Arithmetic saturates instead of
/// failing.
pub fn estimate_pay(
    employee: &Employee,
    hours_worked: Option<Decimal>,
    pieces_completed: Option<Decimal>,
    adjustments: &[CustomAdjustment],
    benefit_deductions: Decimal,
    config: &PayrollConfig,
    error: &EngineError,
) -> PayCalculation {
    let settings = config.settings();

    warn!(
        employee_id = %employee.id,
        error = %error,
        "Pay calculation failed; using fallback estimate"
    );

    let base_gross_pay = resolve_base_pay(
        employee.pay_type,
        employee.pay_rate,
        hours_worked,
        pieces_completed,
        &settings.default_units,
        1,
    )
    .map(|result| result.base_gross_pay)
    .unwrap_or_else(|_| employee.pay_rate.unwrap_or(Decimal::ZERO).max(Decimal::ZERO));

    let gross_affecting_additions = saturating_sum(adjustments, AdjustmentKind::affects_gross);
    let custom_deductions = saturating_sum(adjustments, AdjustmentKind::is_deduction);
    let non_gross_allowances = saturating_sum(adjustments, AdjustmentKind::affects_net_only);

    let gross_pay = base_gross_pay.saturating_add(gross_affecting_additions);
    let tax_deduction = round(
        gross_pay.saturating_mul(settings.fallback_percentage / Decimal::ONE_HUNDRED),
        settings.currency_scale,
    );
    let total_deductions = tax_deduction
        .saturating_add(benefit_deductions)
        .saturating_add(custom_deductions);
    let net_pay = gross_pay
        .saturating_add(non_gross_allowances)
        .saturating_sub(total_deductions);

    let audit_trace = AuditTrace {
        steps: vec![AuditStep {
            step_number: 1,
            rule_id: "fallback_estimate".to_string(),
            rule_name: "Fallback Estimate".to_string(),
            source: "engine".to_string(),
            input: serde_json::json!({
                "gross_pay": gross_pay.normalize().to_string(),
                "fallback_percentage": settings.fallback_percentage.normalize().to_string(),
            }),
            output: serde_json::json!({
                "tax_deduction": tax_deduction.normalize().to_string(),
                "total_deductions": total_deductions.normalize().to_string(),
                "net_pay": net_pay.normalize().to_string(),
            }),
            reasoning: format!(
                "Flat {}% of gross {} withheld in place of statutory rules",
                settings.fallback_percentage.normalize(),
                gross_pay.normalize()
            ),
        }],
        warnings: vec![AuditWarning::new(
            "CALCULATION_FAILED",
            format!("Full calculation failed ({}); figures are an estimate", error),
            "high",
        )],
    };

    PayCalculation {
        employee_id: employee.id.clone(),
        base_gross_pay,
        gross_affecting_additions,
        gross_pay,
        tax_deduction,
        benefit_deductions,
        custom_deductions,
        non_gross_allowances,
        total_deductions,
        net_pay,
        employer_contributions: Decimal::ZERO,
        standard_deductions_breakdown: Vec::new(),
        custom_breakdown: adjustments.to_vec(),
        estimated: true,
        audit_trace,
    }
}

fn saturating_sum(
    adjustments: &[CustomAdjustment],
    predicate: fn(AdjustmentKind) -> bool,
) -> Decimal {
    adjustments
        .iter()
        .filter(|a| predicate(a.kind))
        .fold(Decimal::ZERO, |acc, a| acc.saturating_add(a.amount))
}

//! Pay run generation, recalculation and totals.
//!
//! Every operation that changes a pay item recalculates that item in full and
//! then re-sums the run totals from scratch. Bulk recalculation processes
//! items in parallel batches and aggregates exactly once after every batch
//! has settled.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult, overflow};
use crate::models::{
    AdjustmentKind, CustomAdjustment, Employee, PayItem, PayItemStatus, PayPeriod, PayRun,
    PayRunTotals,
};

use super::custom_adjustments::{validate_adjustment, validate_benefit_deductions};
use super::installments::{
    InstallmentPlan, InstallmentScope, LevyBasis, LevyMethod, plan_installments,
};
use super::pay_item::calculate_pay_item;

/// Summary of a bulk recalculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationReport {
    /// Number of items recalculated.
    pub recalculated: usize,
    /// Employees whose figures are fallback estimates.
    pub estimated: Vec<String>,
}

/// Sums every item's figures into run totals.
///
/// An empty slice yields zero totals.
///
/// # Errors
///
/// Returns a calculation error if a sum overflows.
pub fn aggregate_pay_run(items: &[PayItem]) -> EngineResult<PayRunTotals> {
    items.iter().try_fold(PayRunTotals::default(), |totals, item| {
        Ok(PayRunTotals {
            employee_count: totals.employee_count + 1,
            total_gross_pay: add(totals.total_gross_pay, item.gross_pay, "run gross pay")?,
            total_deductions: add(
                totals.total_deductions,
                item.total_deductions,
                "run deductions",
            )?,
            total_net_pay: add(totals.total_net_pay, item.net_pay, "run net pay")?,
            total_employer_contributions: add(
                totals.total_employer_contributions,
                item.employer_contributions,
                "run employer contributions",
            )?,
        })
    })
}

/// Recomputes `run.totals` from all of its items.
pub fn refresh_totals(run: &mut PayRun) -> EngineResult<()> {
    run.totals = aggregate_pay_run(&run.items)?;
    debug!(
        pay_run = %run.id,
        employees = run.totals.employee_count,
        total_net_pay = %run.totals.total_net_pay,
        "Aggregated pay run totals"
    );
    Ok(())
}

/// Creates a draft run with one calculated item per active employee.
///
/// `carried` maps employee IDs to recurring adjustments from a previous run
/// (see [`PayRun::recurring_adjustments`]).
pub fn generate_pay_run(
    name: impl Into<String>,
    period: PayPeriod,
    employees: &[Employee],
    carried: Option<&HashMap<String, Vec<CustomAdjustment>>>,
    config: &PayrollConfig,
) -> EngineResult<PayRun> {
    let mut run = PayRun::new(name, period);

    run.items = employees
        .iter()
        .filter(|e| e.active)
        .map(|employee| {
            let mut item = PayItem::new(employee.clone());
            if let Some(adjustments) = carried.and_then(|c| c.get(&employee.id)) {
                item.custom_adjustments = adjustments.clone();
            }
            item
        })
        .collect();

    let report = recalculate_pay_run(&mut run, config)?;

    info!(
        pay_run = %run.id,
        period = %run.period.label(),
        employees = run.items.len(),
        skipped_inactive = employees.len() - run.items.len(),
        estimated = report.estimated.len(),
        "Generated pay run"
    );

    Ok(run)
}

/// Recalculates every item of the run in parallel batches, then re-sums totals once.
pub fn recalculate_pay_run(
    run: &mut PayRun,
    config: &PayrollConfig,
) -> EngineResult<RecalculationReport> {
    run.ensure_editable()?;

    let batch_size = config.settings().batch_size.max(1);
    run.items.par_chunks_mut(batch_size).for_each(|batch| {
        for item in batch {
            let calculation = calculate_pay_item(item, config);
            item.apply(calculation);
        }
    });

    refresh_totals(run)?;

    let report = RecalculationReport {
        recalculated: run.items.len(),
        estimated: run
            .items
            .iter()
            .filter(|i| i.status == PayItemStatus::Estimated)
            .map(|i| i.employee_id().to_string())
            .collect(),
    };

    info!(
        pay_run = %run.id,
        recalculated = report.recalculated,
        estimated = report.estimated.len(),
        batch_size,
        "Recalculated pay run"
    );

    Ok(report)
}

/// Recalculates one employee's item and re-sums the run totals.
pub fn recalculate_pay_item(
    run: &mut PayRun,
    employee_id: &str,
    config: &PayrollConfig,
) -> EngineResult<()> {
    run.ensure_editable()?;
    recalculate(run, employee_id, config)?;
    refresh_totals(run)
}

/// Adds a custom adjustment to one employee's item.
pub fn add_custom_adjustment(
    run: &mut PayRun,
    employee_id: &str,
    adjustment: CustomAdjustment,
    config: &PayrollConfig,
) -> EngineResult<()> {
    run.ensure_editable()?;
    validate_adjustment(&adjustment)?;

    run.item_mut(employee_id)?.custom_adjustments.push(adjustment);
    recalculate(run, employee_id, config)?;
    refresh_totals(run)
}

/// Removes the first custom adjustment called `name` from one employee's item.
///
/// Returns the removed adjustment, or `None` when no adjustment had that name.
pub fn remove_custom_adjustment(
    run: &mut PayRun,
    employee_id: &str,
    name: &str,
    config: &PayrollConfig,
) -> EngineResult<Option<CustomAdjustment>> {
    run.ensure_editable()?;

    let item = run.item_mut(employee_id)?;
    let Some(position) = item.custom_adjustments.iter().position(|a| a.name == name) else {
        return Ok(None);
    };
    let removed = item.custom_adjustments.remove(position);

    recalculate(run, employee_id, config)?;
    refresh_totals(run)?;
    Ok(Some(removed))
}

/// Adds the same adjustment to several employees' items.
///
/// Every employee ID is checked before anything changes, so an unknown ID
/// leaves the run untouched. Repeated IDs are applied once. Returns the
/// number of employees the adjustment was added to.
pub fn bulk_add_custom_adjustment(
    run: &mut PayRun,
    employee_ids: &[String],
    adjustment: &CustomAdjustment,
    config: &PayrollConfig,
) -> EngineResult<usize> {
    run.ensure_editable()?;
    validate_adjustment(adjustment)?;
    ensure_items_exist(run, employee_ids.iter().map(String::as_str))?;

    let mut seen = HashSet::new();
    let targets: Vec<&str> = employee_ids
        .iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect();

    for employee_id in &targets {
        run.item_mut(employee_id)?.custom_adjustments.push(adjustment.clone());
        recalculate(run, employee_id, config)?;
    }
    refresh_totals(run)?;

    info!(
        pay_run = %run.id,
        adjustment = %adjustment.name,
        employees = targets.len(),
        "Bulk added custom adjustment"
    );
    Ok(targets.len())
}

/// Sets the manually entered benefit deductions for one employee.
pub fn set_benefit_deductions(
    run: &mut PayRun,
    employee_id: &str,
    amount: Decimal,
    config: &PayrollConfig,
) -> EngineResult<()> {
    run.ensure_editable()?;
    validate_benefit_deductions(amount)?;

    run.item_mut(employee_id)?.benefit_deductions = amount;
    recalculate(run, employee_id, config)?;
    refresh_totals(run)
}

/// Records the period's hours or pieces for one employee.
///
/// `None` keeps the current value.
pub fn set_worked_units(
    run: &mut PayRun,
    employee_id: &str,
    hours_worked: Option<Decimal>,
    pieces_completed: Option<Decimal>,
    config: &PayrollConfig,
) -> EngineResult<()> {
    run.ensure_editable()?;

    let item = run.item_mut(employee_id)?;
    if hours_worked.is_some() {
        item.hours_worked = hours_worked;
    }
    if pieces_completed.is_some() {
        item.pieces_completed = pieces_completed;
    }

    recalculate(run, employee_id, config)?;
    refresh_totals(run)
}

/// Levy candidates for every item in the run, keyed by current gross pay.
pub fn levy_candidates(run: &PayRun) -> Vec<LevyBasis> {
    run.items
        .iter()
        .map(|item| LevyBasis {
            employee_id: item.employee_id().to_string(),
            basis: item.gross_pay,
        })
        .collect()
}

/// Levy candidates for active employees outside any run.
///
/// Each employee is calculated as a fresh pay item and keyed by the
/// resulting gross pay, falling back to the estimate when the calculation
/// fails.
pub fn employee_levy_candidates(
    employees: &[Employee],
    config: &PayrollConfig,
) -> Vec<LevyBasis> {
    employees
        .iter()
        .filter(|e| e.active)
        .map(|employee| {
            let item = PayItem::new(employee.clone());
            LevyBasis {
                employee_id: employee.id.clone(),
                basis: calculate_pay_item(&item, config).gross_pay,
            }
        })
        .collect()
}

/// Previews levy installments for the run's items using the configured levy.
///
/// Pass the result to [`commit_installments`] to persist it.
pub fn plan_run_installments(
    run: &PayRun,
    method: &LevyMethod,
    months: u32,
    scope: &InstallmentScope,
    config: &PayrollConfig,
) -> EngineResult<Vec<InstallmentPlan>> {
    plan_installments(&levy_candidates(run), config.levy(), method, months, scope)
}

/// Persists each plan's current installment as a recurring deduction.
///
/// The deduction is named after the levy schedule and replaces any earlier
/// deduction of that name. Plans with a zero installment only clear the old
/// entry. Returns the number of installments written.
pub fn commit_installments(
    run: &mut PayRun,
    plans: &[InstallmentPlan],
    config: &PayrollConfig,
) -> EngineResult<usize> {
    run.ensure_editable()?;
    ensure_items_exist(run, plans.iter().map(|p| p.employee_id.as_str()))?;

    let levy_name = config.levy().name.clone();
    let mut committed = 0;

    for plan in plans {
        let item = run.item_mut(&plan.employee_id)?;
        item.custom_adjustments.retain(|a| a.name != levy_name);
        if plan.monthly_installment > Decimal::ZERO {
            item.custom_adjustments.push(CustomAdjustment::recurring(
                levy_name.clone(),
                plan.monthly_installment,
                AdjustmentKind::Deduction,
            ));
            committed += 1;
        }
        recalculate(run, &plan.employee_id, config)?;
    }
    refresh_totals(run)?;

    info!(
        pay_run = %run.id,
        levy = %levy_name,
        committed,
        "Committed levy installments"
    );
    Ok(committed)
}

fn recalculate(run: &mut PayRun, employee_id: &str, config: &PayrollConfig) -> EngineResult<()> {
    let item = run.item_mut(employee_id)?;
    let calculation = calculate_pay_item(item, config);
    item.apply(calculation);
    Ok(())
}

fn ensure_items_exist<'a>(
    run: &PayRun,
    mut employee_ids: impl Iterator<Item = &'a str>,
) -> EngineResult<()> {
    match employee_ids.find(|id| run.item(id).is_none()) {
        Some(missing) => Err(EngineError::PayItemNotFound {
            employee_id: missing.to_string(),
        }),
        None => Ok(()),
    }
}

fn add(total: Decimal, amount: Decimal, context: &str) -> EngineResult<Decimal> {
    total.checked_add(amount).ok_or_else(|| overflow(context))
}

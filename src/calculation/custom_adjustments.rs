//! Custom adjustment aggregation.
//!
//! Custom adjustments are folded into three pools by their kind:
//! benefits add to gross pay (and so feed percentage-based statutory rules),
//! allowances are paid on top of net pay, and deductions join total
//! deductions. Gross additions must be aggregated before statutory rules
//! run; the other two pools only after.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult, overflow};
use crate::models::{AdjustmentKind, AuditStep, CustomAdjustment};

/// Sum of benefit-type adjustments, with its audit step.
#[derive(Debug, Clone)]
pub struct GrossAdditionsResult {
    /// Total added to gross pay.
    pub total: Decimal,
    /// The audit step recording this aggregation.
    pub audit_step: AuditStep,
}

/// Sums of deduction-type and allowance-type adjustments, with the audit step.
#[derive(Debug, Clone)]
pub struct NetAdjustmentsResult {
    /// Total added to total deductions.
    pub custom_deductions: Decimal,
    /// Total added to net pay after deductions.
    pub non_gross_allowances: Decimal,
    /// The audit step recording this aggregation.
    pub audit_step: AuditStep,
}

/// Sums the adjustments that add to gross pay.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::aggregate_gross_additions;
/// use payroll_engine::models::{AdjustmentKind, CustomAdjustment};
/// use rust_decimal::Decimal;
///
/// let adjustments = vec![
///     CustomAdjustment::new("Medical", Decimal::new(10000, 0), AdjustmentKind::Benefit),
///     CustomAdjustment::new("Transport", Decimal::new(5000, 0), AdjustmentKind::Allowance),
/// ];
/// let result = aggregate_gross_additions(&adjustments, 2).unwrap();
/// assert_eq!(result.total, Decimal::new(10000, 0));
/// ```
pub fn aggregate_gross_additions(
    adjustments: &[CustomAdjustment],
    step_number: u32,
) -> EngineResult<GrossAdditionsResult> {
    let total = sum_where(adjustments, AdjustmentKind::affects_gross)?;
    let names = names_where(adjustments, AdjustmentKind::affects_gross);

    let audit_step = AuditStep {
        step_number,
        rule_id: "custom_gross_additions".to_string(),
        rule_name: "Gross-Affecting Custom Items".to_string(),
        source: "custom".to_string(),
        input: serde_json::json!({ "benefits": names }),
        output: serde_json::json!({ "gross_affecting_additions": total.normalize().to_string() }),
        reasoning: format!(
            "{} benefit item(s) add {} to gross pay",
            names.len(),
            total.normalize()
        ),
    };

    Ok(GrossAdditionsResult { total, audit_step })
}

/// Sums the adjustments that only act after statutory deductions.
pub fn aggregate_net_adjustments(
    adjustments: &[CustomAdjustment],
    step_number: u32,
) -> EngineResult<NetAdjustmentsResult> {
    let custom_deductions = sum_where(adjustments, AdjustmentKind::is_deduction)?;
    let non_gross_allowances = sum_where(adjustments, AdjustmentKind::affects_net_only)?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "custom_net_items".to_string(),
        rule_name: "Net-Only Custom Items".to_string(),
        source: "custom".to_string(),
        input: serde_json::json!({
            "deductions": names_where(adjustments, AdjustmentKind::is_deduction),
            "allowances": names_where(adjustments, AdjustmentKind::affects_net_only),
        }),
        output: serde_json::json!({
            "custom_deductions": custom_deductions.normalize().to_string(),
            "non_gross_allowances": non_gross_allowances.normalize().to_string(),
        }),
        reasoning: format!(
            "Custom deductions {} withheld; allowances {} paid on top of net",
            custom_deductions.normalize(),
            non_gross_allowances.normalize()
        ),
    };

    Ok(NetAdjustmentsResult {
        custom_deductions,
        non_gross_allowances,
        audit_step,
    })
}

/// Rejects adjustments with an empty name or a negative amount.
pub fn validate_adjustment(adjustment: &CustomAdjustment) -> EngineResult<()> {
    if adjustment.name.trim().is_empty() {
        return Err(EngineError::InvalidAdjustment {
            name: adjustment.name.clone(),
            message: "name must not be empty".to_string(),
        });
    }
    if adjustment.amount.is_sign_negative() {
        return Err(EngineError::InvalidAdjustment {
            name: adjustment.name.clone(),
            message: "amount must not be negative; use the deduction type instead".to_string(),
        });
    }
    Ok(())
}

/// Rejects a negative manually entered benefit deductions amount.
pub fn validate_benefit_deductions(amount: Decimal) -> EngineResult<()> {
    if amount.is_sign_negative() {
        return Err(EngineError::InvalidAdjustment {
            name: "benefit_deductions".to_string(),
            message: "amount must not be negative".to_string(),
        });
    }
    Ok(())
}

fn sum_where(
    adjustments: &[CustomAdjustment],
    predicate: fn(AdjustmentKind) -> bool,
) -> EngineResult<Decimal> {
    adjustments
        .iter()
        .filter(|a| predicate(a.kind))
        .try_fold(Decimal::ZERO, |acc, a| {
            acc.checked_add(a.amount)
                .ok_or_else(|| overflow("custom adjustments"))
        })
}

fn names_where(
    adjustments: &[CustomAdjustment],
    predicate: fn(AdjustmentKind) -> bool,
) -> Vec<&str> {
    adjustments
        .iter()
        .filter(|a| predicate(a.kind))
        .map(|a| a.name.as_str())
        .collect()
}

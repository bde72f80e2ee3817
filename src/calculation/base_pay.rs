//! Base pay resolution.
//!
//! This module turns an employee's pay type, pay rate and worked units into
//! the base gross pay for the period. Absent inputs degrade to defaults with
//! an audit warning rather than failing.

use rust_decimal::Decimal;

use crate::config::DefaultUnits;
use crate::error::{EngineResult, overflow};
use crate::models::{AuditStep, AuditWarning, PayType};

/// The result of resolving base pay, including the audit step.
#[derive(Debug, Clone)]
pub struct BasePayResult {
    /// The non-negative base gross pay.
    pub base_gross_pay: Decimal,
    /// The units multiplied by the rate, for hourly and piece-rate pay.
    pub units: Option<Decimal>,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
    /// Defaults that were substituted.
    pub warnings: Vec<AuditWarning>,
}

/// Computes base gross pay from pay type, rate and units.
///
/// - `Hourly`: `pay_rate × hours_worked`
/// - `PieceRate`: `pay_rate × pieces_completed`
/// - `Salary` and `Unrecognized`: `pay_rate`
///
/// Only the units matching the pay type are read. When they are absent the
/// caller-supplied default is used. A missing rate counts as zero. The result
/// is never negative.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`](crate::error::EngineError) only
/// when `rate × units` overflows.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::resolve_base_pay;
/// use payroll_engine::config::DefaultUnits;
/// use payroll_engine::models::PayType;
/// use rust_decimal::Decimal;
///
/// let result = resolve_base_pay(
///     PayType::Hourly,
///     Some(Decimal::new(5000, 0)),
///     Some(Decimal::new(10, 0)),
///     None,
///     &DefaultUnits::default(),
///     1,
/// )
/// .unwrap();
/// assert_eq!(result.base_gross_pay, Decimal::new(50000, 0));
/// ```
pub fn resolve_base_pay(
    pay_type: PayType,
    pay_rate: Option<Decimal>,
    hours_worked: Option<Decimal>,
    pieces_completed: Option<Decimal>,
    default_units: &DefaultUnits,
    step_number: u32,
) -> EngineResult<BasePayResult> {
    let mut warnings = Vec::new();

    let rate = match pay_rate {
        Some(rate) => rate,
        None => {
            warnings.push(AuditWarning::new(
                "MISSING_PAY_RATE",
                "No pay rate supplied; base pay treated as zero",
                "medium",
            ));
            Decimal::ZERO
        }
    };

    let (units, unit_name) = match pay_type {
        PayType::Hourly => (
            Some(units_or_default(
                hours_worked,
                default_units.hours_worked,
                "hours_worked",
                &mut warnings,
            )),
            "hours_worked",
        ),
        PayType::PieceRate => (
            Some(units_or_default(
                pieces_completed,
                default_units.pieces_completed,
                "pieces_completed",
                &mut warnings,
            )),
            "pieces_completed",
        ),
        PayType::Salary => (None, "none"),
        PayType::Unrecognized => {
            warnings.push(AuditWarning::new(
                "UNKNOWN_PAY_TYPE",
                "Unrecognized pay type; using the pay rate as salary",
                "medium",
            ));
            (None, "none")
        }
    };

    let raw = match units {
        Some(units) => rate.checked_mul(units).ok_or_else(|| overflow("base pay"))?,
        None => rate,
    };
    let base_gross_pay = raw.max(Decimal::ZERO);

    let reasoning = match units {
        Some(units) => format!(
            "{:?} pay: {} × {} {} = {}",
            pay_type,
            rate.normalize(),
            units.normalize(),
            unit_name,
            base_gross_pay.normalize()
        ),
        None => format!(
            "{:?} pay: rate {} used as base pay",
            pay_type,
            base_gross_pay.normalize()
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "base_pay".to_string(),
        rule_name: "Base Pay".to_string(),
        source: "engine".to_string(),
        input: serde_json::json!({
            "pay_type": pay_type,
            "pay_rate": rate.normalize().to_string(),
            "units": units.map(|u| u.normalize().to_string()),
        }),
        output: serde_json::json!({
            "base_gross_pay": base_gross_pay.normalize().to_string(),
        }),
        reasoning,
    };

    Ok(BasePayResult {
        base_gross_pay,
        units,
        audit_step,
        warnings,
    })
}

fn units_or_default(
    units: Option<Decimal>,
    default: Decimal,
    field: &str,
    warnings: &mut Vec<AuditWarning>,
) -> Decimal {
    units.unwrap_or_else(|| {
        warnings.push(AuditWarning::new(
            "MISSING_UNITS",
            format!("No {} supplied; default of {} used", field, default.normalize()),
            "low",
        ));
        default
    })
}

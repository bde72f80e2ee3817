//! Bracket levy installment planning.
//!
//! An annual levy (e.g., Local Service Tax) is looked up from a step table
//! keyed by a basis value such as monthly gross pay, then apportioned into
//! `N` monthly installments (1 to 3). Each installment is
//! `floor(annual / N)`; the remainder is not spread across the current
//! computation and stays with the caller for later periods.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LevySchedule;
use crate::error::{EngineError, EngineResult};

/// The smallest supported installment count.
pub const MIN_INSTALLMENT_MONTHS: u32 = 1;

/// The largest supported installment count.
pub const MAX_INSTALLMENT_MONTHS: u32 = 3;

/// How each employee's annual liability is determined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LevyMethod {
    /// Look the basis up in the levy step table.
    BracketLookup,
    /// Charge every in-scope employee the same annual amount.
    FixedAmount {
        /// The annual amount.
        amount: Decimal,
    },
}

/// Which employees a plan covers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstallmentScope {
    /// Every employee supplied.
    #[default]
    All,
    /// Only the listed employee IDs.
    Selected {
        /// IDs to include.
        employee_ids: Vec<String>,
    },
    /// Only employees whose basis is at or above `minimum`.
    Threshold {
        /// Inclusive lower bound on the basis.
        minimum: Decimal,
    },
}

impl InstallmentScope {
    fn includes(&self, candidate: &LevyBasis) -> bool {
        match self {
            Self::All => true,
            Self::Selected { employee_ids } => {
                employee_ids.iter().any(|id| *id == candidate.employee_id)
            }
            Self::Threshold { minimum } => candidate.basis >= *minimum,
        }
    }
}

/// An employee and the value their levy is looked up by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevyBasis {
    /// The employee ID.
    pub employee_id: String,
    /// The lookup value, typically gross pay.
    pub basis: Decimal,
}

/// One employee's annual liability and current installment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    /// The employee ID.
    pub employee_id: String,
    /// The lookup value used.
    pub basis: Decimal,
    /// The full annual liability.
    pub annual_liability: Decimal,
    /// Number of installments the liability is spread over.
    pub months: u32,
    /// The amount due this period.
    pub monthly_installment: Decimal,
    /// `annual_liability - monthly_installment × months`, left for later periods.
    pub deferred_remainder: Decimal,
}

/// Looks up the annual liability for `basis` in a step table.
///
/// The highest threshold not exceeding `basis` wins; there is no blending
/// between steps. A basis below every threshold owes nothing.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::annual_liability;
/// use payroll_engine::config::{LevyBracket, LevySchedule};
/// use rust_decimal::Decimal;
///
/// let schedule = LevySchedule {
///     name: "Local Service Tax".to_string(),
///     brackets: vec![
///         LevyBracket { threshold: Decimal::ZERO, annual_amount: Decimal::ZERO },
///         LevyBracket { threshold: Decimal::new(100000, 0), annual_amount: Decimal::new(5000, 0) },
///     ],
/// };
/// assert_eq!(annual_liability(&schedule, Decimal::new(99999, 0)), Decimal::ZERO);
/// assert_eq!(annual_liability(&schedule, Decimal::new(100000, 0)), Decimal::new(5000, 0));
/// ```
pub fn annual_liability(schedule: &LevySchedule, basis: Decimal) -> Decimal {
    schedule
        .brackets
        .iter()
        .rev()
        .find(|b| b.threshold <= basis)
        .map(|b| b.annual_amount)
        .unwrap_or(Decimal::ZERO)
}

/// Splits an annual liability into the current installment and the remainder.
///
/// With one month the whole liability is due at once.
pub fn apportion(annual: Decimal, months: u32) -> EngineResult<(Decimal, Decimal)> {
    check_months(months)?;

    if months == 1 {
        return Ok((annual, Decimal::ZERO));
    }

    let count = Decimal::from(months);
    let installment = (annual / count).floor();
    Ok((installment, annual - installment * count))
}

/// Previews installments for every in-scope candidate.
///
/// # Errors
///
/// Returns [`EngineError::InvalidInstallmentMonths`] when `months` is not 1 to 3,
/// and [`EngineError::InvalidRule`] for a negative fixed amount.
pub fn plan_installments(
    candidates: &[LevyBasis],
    schedule: &LevySchedule,
    method: &LevyMethod,
    months: u32,
    scope: &InstallmentScope,
) -> EngineResult<Vec<InstallmentPlan>> {
    check_months(months)?;
    if matches!(method, LevyMethod::FixedAmount { amount } if amount.is_sign_negative()) {
        return Err(EngineError::InvalidRule {
            rule: schedule.name.clone(),
            message: "fixed levy amount must not be negative".to_string(),
        });
    }

    let plans = candidates
        .iter()
        .filter(|c| scope.includes(c))
        .map(|candidate| {
            let annual = match method {
                LevyMethod::BracketLookup => annual_liability(schedule, candidate.basis),
                LevyMethod::FixedAmount { amount } => *amount,
            };
            let (monthly_installment, deferred_remainder) = apportion(annual, months)?;
            Ok(InstallmentPlan {
                employee_id: candidate.employee_id.clone(),
                basis: candidate.basis,
                annual_liability: annual,
                months,
                monthly_installment,
                deferred_remainder,
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    debug!(
        levy = %schedule.name,
        candidates = candidates.len(),
        planned = plans.len(),
        months,
        "Planned levy installments"
    );

    Ok(plans)
}

fn check_months(months: u32) -> EngineResult<()> {
    if (MIN_INSTALLMENT_MONTHS..=MAX_INSTALLMENT_MONTHS).contains(&months) {
        Ok(())
    } else {
        Err(EngineError::InvalidInstallmentMonths { months })
    }
}

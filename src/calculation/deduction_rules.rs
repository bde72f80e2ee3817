//! Statutory deduction rule evaluation.
//!
//! This module resolves which rule set applies to an employee (the country
//! table, or the flat expatriate regime that replaces it) and evaluates each
//! rule against gross pay. Every rule is computed independently from the same
//! gross; there is no cascading remainder base.
//!
//! Employer-side amounts (from `employer_only` rules or a rule's
//! `employer_percentage`) accumulate in `employer_contributions` and never
//! reach the employee's deductions.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::{DeductionRule, ExpatriatePolicy, PayrollConfig, RuleBasis, RuleBracket};
use crate::error::{EngineResult, overflow};
use crate::models::{AuditStep, AuditWarning, DeductionLine, Employee};

/// Source label used on expatriate deduction lines.
pub const EXPATRIATE_SOURCE: &str = "expatriate";

/// The rule set that applies to one employee, resolved once before evaluation.
#[derive(Debug, Clone, Copy)]
pub enum DeductionRegime<'a> {
    /// The country's table; empty when the country is unknown.
    Local {
        /// The country code the table was looked up with.
        country: &'a str,
        /// Rules in evaluation order.
        rules: &'a [DeductionRule],
    },
    /// A single flat-rate rule replacing the country table entirely.
    Expatriate(&'a ExpatriatePolicy),
}

/// Picks the rule set for an employee.
///
/// Expatriates always get the flat regime regardless of country. A local
/// employee in a country with no table gets an empty rule set plus an
/// `UNKNOWN_COUNTRY` warning.
pub fn resolve_regime<'a>(
    employee: &'a Employee,
    config: &'a PayrollConfig,
) -> (DeductionRegime<'a>, Option<AuditWarning>) {
    if employee.is_expatriate() {
        return (
            DeductionRegime::Expatriate(&config.settings().expatriate),
            None,
        );
    }

    match config.country(&employee.country) {
        Some(country) => (
            DeductionRegime::Local {
                country: &country.code,
                rules: &country.rules,
            },
            None,
        ),
        None => (
            DeductionRegime::Local {
                country: &employee.country,
                rules: &[],
            },
            Some(AuditWarning::new(
                "UNKNOWN_COUNTRY",
                format!(
                    "No statutory rule table for country '{}'; no statutory deductions applied",
                    employee.country
                ),
                "medium",
            )),
        ),
    }
}

/// The combined outcome of every applicable statutory rule.
#[derive(Debug, Clone)]
pub struct StatutoryResult {
    /// Sum of employee-side amounts.
    pub tax_deduction: Decimal,
    /// Sum of employer-side amounts.
    pub employer_contributions: Decimal,
    /// One line per rule applied.
    pub lines: Vec<DeductionLine>,
    /// One audit step per rule applied.
    pub audit_steps: Vec<AuditStep>,
}

/// Evaluates every applicable rule of `regime` against `gross_pay`.
///
/// Non-mandatory rules in a local table are skipped. Amounts are rounded to
/// `scale` decimal places per rule.
///
/// # Errors
///
/// Returns a calculation error when an amount overflows.
pub fn apply_statutory_rules(
    regime: DeductionRegime<'_>,
    gross_pay: Decimal,
    scale: u32,
    step_number: u32,
) -> EngineResult<StatutoryResult> {
    let lines = match regime {
        DeductionRegime::Expatriate(policy) => {
            vec![evaluate_expatriate(policy, gross_pay, scale)?]
        }
        DeductionRegime::Local { country, rules } => rules
            .iter()
            .filter(|rule| rule.mandatory)
            .map(|rule| evaluate_rule(rule, gross_pay, country, scale))
            .collect::<EngineResult<Vec<_>>>()?,
    };

    let mut tax_deduction = Decimal::ZERO;
    let mut employer_contributions = Decimal::ZERO;
    for line in &lines {
        tax_deduction = tax_deduction
            .checked_add(line.employee_amount)
            .ok_or_else(|| overflow("statutory deductions"))?;
        employer_contributions = employer_contributions
            .checked_add(line.employer_amount)
            .ok_or_else(|| overflow("employer contributions"))?;
    }

    let audit_steps = lines
        .iter()
        .enumerate()
        .map(|(i, line)| audit_step_for(line, step_number + i as u32))
        .collect();

    Ok(StatutoryResult {
        tax_deduction,
        employer_contributions,
        lines,
        audit_steps,
    })
}

/// Evaluates one country rule against gross pay.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::evaluate_rule;
/// use payroll_engine::config::{DeductionRule, RuleBasis};
/// use rust_decimal::Decimal;
///
/// let rule = DeductionRule {
///     name: "NSSF".to_string(),
///     mandatory: true,
///     basis: RuleBasis::Percentage(Decimal::new(5, 0)),
///     cap: None,
///     employer_only: false,
///     employer_percentage: Some(Decimal::new(10, 0)),
///     employer_base_cap: None,
/// };
///
/// let line = evaluate_rule(&rule, Decimal::new(60000, 0), "UG", 2).unwrap();
/// assert_eq!(line.employee_amount, Decimal::new(3000, 0));
/// assert_eq!(line.employer_amount, Decimal::new(6000, 0));
/// ```
pub fn evaluate_rule(
    rule: &DeductionRule,
    gross_pay: Decimal,
    source: &str,
    scale: u32,
) -> EngineResult<DeductionLine> {
    let basis_amount = gross_pay.max(Decimal::ZERO);
    let employer_basis = match rule.employer_base_cap {
        Some(ceiling) => basis_amount.min(ceiling),
        None => basis_amount,
    };

    let (employee_amount, employer_amount, capped) = if rule.employer_only {
        let raw = basis_amount_for(&rule.basis, employer_basis, &rule.name)?;
        let (amount, capped) = apply_cap(raw, rule.cap);
        (Decimal::ZERO, round(amount, scale), capped)
    } else {
        let raw = basis_amount_for(&rule.basis, basis_amount, &rule.name)?;
        let (amount, capped) = apply_cap(raw, rule.cap);
        let employer = match rule.employer_percentage {
            Some(percentage) => percent_of(employer_basis, percentage, &rule.name)?,
            None => Decimal::ZERO,
        };
        (round(amount, scale), round(employer, scale), capped)
    };

    let percentage = match &rule.basis {
        RuleBasis::Percentage(p) => Some(*p),
        RuleBasis::Brackets(_) => None,
    };

    Ok(DeductionLine {
        rule_name: rule.name.clone(),
        source: source.to_string(),
        basis_amount,
        percentage,
        employee_amount,
        employer_amount,
        capped,
    })
}

fn evaluate_expatriate(
    policy: &ExpatriatePolicy,
    gross_pay: Decimal,
    scale: u32,
) -> EngineResult<DeductionLine> {
    let basis_amount = gross_pay.max(Decimal::ZERO);
    let amount = percent_of(basis_amount, policy.percentage, &policy.rule_name)?;

    Ok(DeductionLine {
        rule_name: policy.rule_name.clone(),
        source: EXPATRIATE_SOURCE.to_string(),
        basis_amount,
        percentage: Some(policy.percentage),
        employee_amount: round(amount, scale),
        employer_amount: Decimal::ZERO,
        capped: false,
    })
}

fn basis_amount_for(basis: &RuleBasis, amount: Decimal, rule_name: &str) -> EngineResult<Decimal> {
    match basis {
        RuleBasis::Percentage(percentage) => percent_of(amount, *percentage, rule_name),
        RuleBasis::Brackets(brackets) => bracket_amount(brackets, amount, rule_name),
    }
}

/// Progressive amount for `amount` under an ascending bracket table.
///
/// The highest bracket whose threshold does not exceed `amount` applies:
/// its base amount plus its percentage of the excess over the threshold.
/// Below the first threshold nothing is owed.
fn bracket_amount(
    brackets: &[RuleBracket],
    amount: Decimal,
    rule_name: &str,
) -> EngineResult<Decimal> {
    let Some(bracket) = brackets.iter().rev().find(|b| b.threshold <= amount) else {
        return Ok(Decimal::ZERO);
    };

    let excess = amount - bracket.threshold;
    let marginal = percent_of(excess, bracket.percentage, rule_name)?;
    bracket
        .base_amount
        .checked_add(marginal)
        .ok_or_else(|| overflow(rule_name))
}

fn percent_of(amount: Decimal, percentage: Decimal, rule_name: &str) -> EngineResult<Decimal> {
    amount
        .checked_mul(percentage)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| overflow(rule_name))
}

fn apply_cap(amount: Decimal, cap: Option<Decimal>) -> (Decimal, bool) {
    match cap {
        Some(cap) if amount > cap => (cap, true),
        _ => (amount, false),
    }
}

pub(crate) fn round(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

fn audit_step_for(line: &DeductionLine, step_number: u32) -> AuditStep {
    let reasoning = match (line.percentage, line.employer_amount > Decimal::ZERO) {
        (Some(p), false) => format!(
            "{}: {}% of {} = {}{}",
            line.rule_name,
            p.normalize(),
            line.basis_amount.normalize(),
            line.employee_amount.normalize(),
            if line.capped { " (capped)" } else { "" }
        ),
        (None, false) => format!(
            "{}: bracket lookup on {} = {}{}",
            line.rule_name,
            line.basis_amount.normalize(),
            line.employee_amount.normalize(),
            if line.capped { " (capped)" } else { "" }
        ),
        (_, true) => format!(
            "{}: employee {} and employer {} on {}",
            line.rule_name,
            line.employee_amount.normalize(),
            line.employer_amount.normalize(),
            line.basis_amount.normalize()
        ),
    };

    AuditStep {
        step_number,
        rule_id: format!("statutory:{}", line.rule_name),
        rule_name: line.rule_name.clone(),
        source: line.source.clone(),
        input: serde_json::json!({
            "gross_pay": line.basis_amount.normalize().to_string(),
            "percentage": line.percentage.map(|p| p.normalize().to_string()),
        }),
        output: serde_json::json!({
            "employee_amount": line.employee_amount.normalize().to_string(),
            "employer_amount": line.employer_amount.normalize().to_string(),
            "capped": line.capped,
        }),
        reasoning,
    }
}

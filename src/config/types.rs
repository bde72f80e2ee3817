//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files: engine settings, the
//! per-country statutory rule tables and the bracket levy schedule.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The flat-rate regime that replaces a country table for expatriates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpatriatePolicy {
    /// Name recorded on the single deduction line (e.g., "Expatriate Flat Tax").
    pub rule_name: String,
    /// Percentage of gross pay withheld (e.g., 15).
    pub percentage: Decimal,
}

/// Units assumed when neither the pay item nor the employee carries one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultUnits {
    /// Default hours worked for hourly employees.
    #[serde(default)]
    pub hours_worked: Decimal,
    /// Default pieces completed for piece-rate employees.
    #[serde(default)]
    pub pieces_completed: Decimal,
}

/// Engine-wide settings from `engine.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// The expatriate flat-rate regime.
    pub expatriate: ExpatriatePolicy,
    /// Flat percentage used for the fallback estimate when a calculation fails.
    #[serde(default = "default_fallback_percentage")]
    pub fallback_percentage: Decimal,
    /// Unit defaults for absent hours/pieces.
    #[serde(default)]
    pub default_units: DefaultUnits,
    /// Decimal places statutory amounts are rounded to.
    #[serde(default = "default_currency_scale")]
    pub currency_scale: u32,
    /// Number of pay items per parallel batch during bulk recalculation.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_fallback_percentage() -> Decimal {
    Decimal::new(10, 0)
}

fn default_currency_scale() -> u32 {
    2
}

fn default_batch_size() -> usize {
    64
}

fn default_true() -> bool {
    true
}

/// One row of a progressive statutory bracket table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBracket {
    /// Lower bound of the band (inclusive).
    pub threshold: Decimal,
    /// Percentage applied to the part of gross above `threshold`.
    pub percentage: Decimal,
    /// Fixed amount owed on reaching `threshold`.
    #[serde(default)]
    pub base_amount: Decimal,
}

/// How a deduction rule computes its amount from gross pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleBasis {
    /// A flat percentage of gross pay.
    Percentage(Decimal),
    /// An ascending bracket table.
    Brackets(Vec<RuleBracket>),
}

/// A statutory deduction rule in a country table.
///
/// # Example
///
/// ```
/// use payroll_engine::config::{DeductionRule, RuleBasis};
///
/// let yaml = r#"
/// name: NSSF
/// basis:
///   percentage: "5"
/// employer_percentage: "10"
/// "#;
/// let rule: DeductionRule = serde_yaml::from_str(yaml).unwrap();
/// assert!(rule.mandatory);
/// assert!(matches!(rule.basis, RuleBasis::Percentage(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionRule {
    /// Rule name (e.g., "PAYE", "NSSF Employer").
    pub name: String,
    /// Only mandatory rules are applied by the engine.
    #[serde(default = "default_true")]
    pub mandatory: bool,
    /// How the amount is computed.
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub basis: RuleBasis,
    /// Upper limit on the computed amount.
    #[serde(default)]
    pub cap: Option<Decimal>,
    /// The whole amount is borne by the employer, never the employee.
    #[serde(default)]
    pub employer_only: bool,
    /// Employer-side percentage charged alongside the employee amount.
    #[serde(default)]
    pub employer_percentage: Option<Decimal>,
    /// Ceiling on the gross used for employer-side amounts.
    #[serde(default)]
    pub employer_base_cap: Option<Decimal>,
}

impl DeductionRule {
    /// Checks percentages, caps and bracket ordering.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: &str| EngineError::InvalidRule {
            rule: self.name.clone(),
            message: message.to_string(),
        };

        match &self.basis {
            RuleBasis::Percentage(p) if p.is_sign_negative() => {
                return Err(invalid("percentage must not be negative"));
            }
            RuleBasis::Brackets(brackets) => {
                if brackets.is_empty() {
                    return Err(invalid("bracket table must not be empty"));
                }
                if brackets.windows(2).any(|w| w[0].threshold >= w[1].threshold) {
                    return Err(invalid("bracket thresholds must be strictly ascending"));
                }
                if brackets
                    .iter()
                    .any(|b| b.percentage.is_sign_negative() || b.base_amount.is_sign_negative())
                {
                    return Err(invalid("bracket amounts must not be negative"));
                }
            }
            RuleBasis::Percentage(_) => {}
        }

        let negative = |v: &Option<Decimal>| v.is_some_and(|d| d.is_sign_negative());
        if negative(&self.cap)
            || negative(&self.employer_percentage)
            || negative(&self.employer_base_cap)
        {
            return Err(invalid("caps and employer percentages must not be negative"));
        }
        if self.employer_only && self.employer_percentage.is_some() {
            return Err(invalid("an employer-only rule cannot carry a second employer percentage"));
        }
        Ok(())
    }
}

/// A country's ordered statutory rule table, from `countries/<code>.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRules {
    /// ISO country code (e.g., "UG").
    pub code: String,
    /// Country name.
    pub name: String,
    /// Currency code, informational.
    #[serde(default)]
    pub currency: String,
    /// Rules in evaluation order.
    pub rules: Vec<DeductionRule>,
}

/// One step of the annual levy table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevyBracket {
    /// Basis at or above which this liability applies.
    pub threshold: Decimal,
    /// The absolute annual liability for this step.
    pub annual_amount: Decimal,
}

/// The bracket levy schedule from `levy.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevySchedule {
    /// Name given to the recurring deduction that carries installments.
    pub name: String,
    /// Ascending step table.
    pub brackets: Vec<LevyBracket>,
}

impl LevySchedule {
    /// Checks that thresholds ascend and amounts are non-negative.
    pub fn validate(&self) -> EngineResult<()> {
        if self.brackets.windows(2).any(|w| w[0].threshold >= w[1].threshold) {
            return Err(EngineError::InvalidRule {
                rule: self.name.clone(),
                message: "levy thresholds must be strictly ascending".to_string(),
            });
        }
        if self.brackets.iter().any(|b| b.annual_amount.is_sign_negative()) {
            return Err(EngineError::InvalidRule {
                rule: self.name.clone(),
                message: "levy amounts must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// An immutable snapshot of everything a calculation consumes.
///
/// The snapshot is passed by reference into each calculation; refreshing it
/// is the caller's concern.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    settings: EngineSettings,
    countries: HashMap<String, CountryRules>,
    levy: LevySchedule,
}

impl PayrollConfig {
    /// Builds a validated snapshot. Country codes are normalized to upper case.
    pub fn new(
        settings: EngineSettings,
        countries: Vec<CountryRules>,
        levy: LevySchedule,
    ) -> EngineResult<Self> {
        levy.validate()?;

        let mut by_code = HashMap::with_capacity(countries.len());
        for mut country in countries {
            for rule in &country.rules {
                rule.validate()?;
            }
            country.code = country.code.to_ascii_uppercase();
            let code = country.code.clone();
            if by_code.insert(code.clone(), country).is_some() {
                return Err(EngineError::InvalidRule {
                    rule: code,
                    message: "country rule table defined more than once".to_string(),
                });
            }
        }

        Ok(Self {
            settings,
            countries: by_code,
            levy,
        })
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Looks up a country table, case-insensitively.
    pub fn country(&self, code: &str) -> Option<&CountryRules> {
        self.countries.get(&code.to_ascii_uppercase())
    }

    /// Returns all country tables.
    pub fn countries(&self) -> &HashMap<String, CountryRules> {
        &self.countries
    }

    /// Returns the bracket levy schedule.
    pub fn levy(&self) -> &LevySchedule {
        &self.levy
    }
}

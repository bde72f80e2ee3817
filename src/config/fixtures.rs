//! In-memory configuration builders shared by unit tests.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::{Employee, EmployeeType, PayType};

use super::{
    CountryRules, DeductionRule, DefaultUnits, EngineSettings, ExpatriatePolicy, LevyBracket,
    LevySchedule, PayrollConfig, RuleBasis, RuleBracket,
};

pub(crate) fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub(crate) fn settings() -> EngineSettings {
    EngineSettings {
        expatriate: ExpatriatePolicy {
            rule_name: "Expatriate Flat Tax".to_string(),
            percentage: dec("15"),
        },
        fallback_percentage: dec("10"),
        default_units: DefaultUnits::default(),
        currency_scale: 2,
        batch_size: 2,
    }
}

pub(crate) fn levy() -> LevySchedule {
    let steps = [
        ("0", "0"),
        ("100000", "5000"),
        ("200000", "10000"),
        ("300000", "20000"),
        ("400000", "30000"),
        ("500000", "40000"),
    ];
    LevySchedule {
        name: "Local Service Tax".to_string(),
        brackets: steps
            .iter()
            .map(|(threshold, amount)| LevyBracket {
                threshold: dec(threshold),
                annual_amount: dec(amount),
            })
            .collect(),
    }
}

pub(crate) fn percentage_rule(name: &str, percentage: &str) -> DeductionRule {
    DeductionRule {
        name: name.to_string(),
        mandatory: true,
        basis: RuleBasis::Percentage(dec(percentage)),
        cap: None,
        employer_only: false,
        employer_percentage: None,
        employer_base_cap: None,
    }
}

pub(crate) fn employer_rule(name: &str, percentage: &str) -> DeductionRule {
    DeductionRule {
        employer_only: true,
        ..percentage_rule(name, percentage)
    }
}

pub(crate) fn uganda_paye() -> DeductionRule {
    DeductionRule {
        basis: RuleBasis::Brackets(vec![
            RuleBracket {
                threshold: dec("0"),
                percentage: dec("0"),
                base_amount: dec("0"),
            },
            RuleBracket {
                threshold: dec("235000"),
                percentage: dec("10"),
                base_amount: dec("0"),
            },
            RuleBracket {
                threshold: dec("335000"),
                percentage: dec("20"),
                base_amount: dec("10000"),
            },
            RuleBracket {
                threshold: dec("410000"),
                percentage: dec("30"),
                base_amount: dec("25000"),
            },
        ]),
        ..percentage_rule("PAYE", "0")
    }
}

pub(crate) fn country(code: &str, rules: Vec<DeductionRule>) -> CountryRules {
    CountryRules {
        code: code.to_string(),
        name: code.to_string(),
        currency: String::new(),
        rules,
    }
}

/// "XX" carries a single mandatory 5% rule; "UG" carries PAYE and NSSF.
pub(crate) fn test_config() -> PayrollConfig {
    PayrollConfig::new(
        settings(),
        vec![
            country("XX", vec![percentage_rule("Flat Levy", "5")]),
            country(
                "UG",
                vec![
                    uganda_paye(),
                    percentage_rule("NSSF", "5"),
                    employer_rule("NSSF Employer", "10"),
                ],
            ),
        ],
        levy(),
    )
    .unwrap()
}

pub(crate) fn employee(id: &str, pay_type: PayType, rate: &str, country: &str) -> Employee {
    Employee {
        id: id.to_string(),
        name: format!("Employee {}", id),
        pay_type,
        pay_rate: Some(dec(rate)),
        country: country.to_string(),
        employee_type: EmployeeType::Local,
        hours_worked: None,
        pieces_completed: None,
        active: true,
    }
}

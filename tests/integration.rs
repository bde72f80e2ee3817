//! Integration tests for the payroll engine.
//!
//! This test suite runs against the shipped `config/payroll` rule tables and
//! covers:
//! - Country statutory tables (UG, KE, TZ)
//! - Expatriate flat tax
//! - Custom adjustments and their effect on gross and net
//! - Levy installment preview and commit
//! - Pay run lifecycle and totals
//! - HTTP endpoints and error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::calculation::{
    InstallmentScope, LevyBasis, LevyMethod, add_custom_adjustment, calculate_pay,
    commit_installments, generate_pay_run, plan_installments, plan_run_installments,
    recalculate_pay_run,
};
use payroll_engine::config::{ConfigLoader, PayrollConfig};
use payroll_engine::error::EngineError;
use payroll_engine::models::{
    AdjustmentKind, CustomAdjustment, Employee, EmployeeType, PayCalculation, PayPeriod,
    PayRunStatus, PayType,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn load_config() -> PayrollConfig {
    ConfigLoader::load("./config/payroll")
        .expect("Failed to load config")
        .into_config()
}

fn create_router_for_test() -> Router {
    let config = ConfigLoader::load("./config/payroll").expect("Failed to load config");
    create_router(AppState::new(config))
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn salaried(id: &str, rate: &str, country: &str) -> Employee {
    Employee {
        id: id.to_string(),
        name: format!("Employee {}", id),
        pay_type: PayType::Salary,
        pay_rate: Some(decimal(rate)),
        country: country.to_string(),
        employee_type: EmployeeType::Local,
        hours_worked: None,
        pieces_completed: None,
        active: true,
    }
}

fn july() -> PayPeriod {
    PayPeriod {
        start_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 7, 31).unwrap(),
    }
}

fn calculate(employee: &Employee, adjustments: &[CustomAdjustment]) -> PayCalculation {
    calculate_pay(
        employee,
        employee.hours_worked,
        employee.pieces_completed,
        adjustments,
        Decimal::ZERO,
        &load_config(),
    )
    .unwrap()
}

fn line_amount(result: &PayCalculation, rule_name: &str) -> (Decimal, Decimal) {
    let line = result
        .standard_deductions_breakdown
        .iter()
        .find(|l| l.rule_name == rule_name)
        .unwrap_or_else(|| panic!("No deduction line named '{}'", rule_name));
    (line.employee_amount, line.employer_amount)
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

fn assert_decimal_field(result: &Value, field: &str, expected: &str) {
    let actual = result[field].as_str().unwrap();
    assert_eq!(
        decimal(actual).normalize(),
        decimal(expected).normalize(),
        "Expected {} {}, got {}",
        field,
        expected,
        actual
    );
}

// =============================================================================
// SECTION 1: Country Statutory Tables
// =============================================================================

#[test]
fn test_uganda_salary_paye_and_nssf() {
    // PAYE: 25,000 + 30% of (600,000 - 410,000) = 82,000
    // NSSF: 5% of 600,000 = 30,000; employer 10% = 60,000
    let result = calculate(&salaried("emp_ug_001", "600000", "UG"), &[]);

    assert_eq!(line_amount(&result, "PAYE"), (decimal("82000"), Decimal::ZERO));
    assert_eq!(line_amount(&result, "NSSF"), (decimal("30000"), Decimal::ZERO));
    assert_eq!(line_amount(&result, "NSSF Employer"), (Decimal::ZERO, decimal("60000")));
    assert_eq!(result.tax_deduction, decimal("112000"));
    assert_eq!(result.employer_contributions, decimal("60000"));
    assert_eq!(result.net_pay, decimal("488000"));
}

#[test]
fn test_uganda_below_paye_threshold() {
    let result = calculate(&salaried("emp_ug_002", "200000", "ug"), &[]);

    assert_eq!(line_amount(&result, "PAYE").0, Decimal::ZERO);
    assert_eq!(result.tax_deduction, decimal("10000"));
    assert_eq!(result.net_pay, decimal("190000"));
}

#[test]
fn test_kenya_caps_and_employer_base_cap() {
    // PAYE: 4,483.25 + 30% of (100,000 - 32,333) = 24,783.35
    // NSSF: 6% = 6,000 capped at 4,320; employer 6% of min(100,000, 72,000) = 4,320
    // SHIF: 2,750; Housing Levy: 1,500 + employer 1,500; Voluntary Pension skipped
    let result = calculate(&salaried("emp_ke_001", "100000", "KE"), &[]);

    assert_eq!(line_amount(&result, "PAYE").0, decimal("24783.35"));
    assert_eq!(line_amount(&result, "NSSF"), (decimal("4320"), decimal("4320")));
    assert_eq!(line_amount(&result, "SHIF").0, decimal("2750"));
    assert_eq!(line_amount(&result, "Housing Levy"), (decimal("1500"), decimal("1500")));
    assert!(result
        .standard_deductions_breakdown
        .iter()
        .all(|l| l.rule_name != "Voluntary Pension"));

    assert_eq!(result.tax_deduction, decimal("33353.35"));
    assert_eq!(result.employer_contributions, decimal("5820"));
    assert_eq!(result.net_pay, decimal("66646.65"));
}

#[test]
fn test_tanzania_employer_only_levies() {
    let result = calculate(&salaried("emp_tz_001", "1000000", "TZ"), &[]);

    assert_eq!(line_amount(&result, "PAYE").0, decimal("128000"));
    assert_eq!(line_amount(&result, "SDL"), (Decimal::ZERO, decimal("35000")));
    assert_eq!(line_amount(&result, "WCF"), (Decimal::ZERO, decimal("5000")));
    assert_eq!(result.tax_deduction, decimal("228000"));
    assert_eq!(result.employer_contributions, decimal("140000"));
    assert_eq!(result.net_pay, decimal("772000"));
}

#[test]
fn test_unknown_country_pays_gross() {
    let result = calculate(&salaried("emp_zz_001", "450000", "ZZ"), &[]);

    assert_eq!(result.tax_deduction, Decimal::ZERO);
    assert_eq!(result.net_pay, decimal("450000"));
    assert!(result
        .audit_trace
        .warnings
        .iter()
        .any(|w| w.code == "UNKNOWN_COUNTRY"));
}

// =============================================================================
// SECTION 2: Expatriate Regime
// =============================================================================

#[test]
fn test_expatriate_flat_tax_replaces_every_country_table() {
    for country in ["UG", "KE", "TZ", "ZZ"] {
        let mut expat = salaried("emp_ex_001", "1000000", country);
        expat.employee_type = EmployeeType::Expatriate;

        let result = calculate(&expat, &[]);

        assert_eq!(result.tax_deduction, decimal("150000"), "country {}", country);
        assert_eq!(result.employer_contributions, Decimal::ZERO);
        assert_eq!(result.standard_deductions_breakdown.len(), 1);
        assert_eq!(result.net_pay, decimal("850000"));
    }
}

// =============================================================================
// SECTION 3: Custom Adjustments
// =============================================================================

#[test]
fn test_benefit_moves_employee_into_higher_paye_band() {
    // 400,000 base sits in the 20% band; a 20,000 benefit lifts gross to 420,000,
    // past the 410,000 threshold.
    let employee = salaried("emp_ug_003", "400000", "UG");
    let without = calculate(&employee, &[]);
    let with = calculate(
        &employee,
        &[CustomAdjustment::new("Housing", decimal("20000"), AdjustmentKind::Benefit)],
    );

    assert_eq!(line_amount(&without, "PAYE").0, decimal("23000"));
    assert_eq!(line_amount(&with, "PAYE").0, decimal("28000"));
    assert_eq!(with.gross_pay, decimal("420000"));
}

#[test]
fn test_allowance_and_deduction_only_touch_net() {
    let employee = salaried("emp_ug_004", "600000", "UG");
    let baseline = calculate(&employee, &[]);
    let result = calculate(
        &employee,
        &[
            CustomAdjustment::new("Transport", decimal("50000"), AdjustmentKind::Allowance),
            CustomAdjustment::new("Salary Advance", decimal("100000"), AdjustmentKind::Deduction),
        ],
    );

    assert_eq!(result.gross_pay, baseline.gross_pay);
    assert_eq!(result.tax_deduction, baseline.tax_deduction);
    assert_eq!(result.total_deductions, baseline.total_deductions + decimal("100000"));
    assert_eq!(result.net_pay, baseline.net_pay + decimal("50000") - decimal("100000"));
}

#[test]
fn test_piece_rate_and_hourly_bases() {
    let mut picker = salaried("emp_ug_005", "500", "ZZ");
    picker.pay_type = PayType::PieceRate;
    picker.pieces_completed = Some(decimal("300"));
    assert_eq!(calculate(&picker, &[]).base_gross_pay, decimal("150000"));

    let mut casual = salaried("emp_ug_006", "5000", "ZZ");
    casual.pay_type = PayType::Hourly;
    assert_eq!(calculate(&casual, &[]).base_gross_pay, Decimal::ZERO);
}

// =============================================================================
// SECTION 4: Levy Installments
// =============================================================================

#[test]
fn test_levy_step_table_from_config() {
    let config = load_config();
    let plans = plan_installments(
        &[
            LevyBasis {
                employee_id: "a".to_string(),
                basis: decimal("99999"),
            },
            LevyBasis {
                employee_id: "b".to_string(),
                basis: decimal("100000"),
            },
            LevyBasis {
                employee_id: "c".to_string(),
                basis: decimal("250000"),
            },
        ],
        config.levy(),
        &LevyMethod::BracketLookup,
        3,
        &InstallmentScope::All,
    )
    .unwrap();

    let annual: Vec<Decimal> = plans.iter().map(|p| p.annual_liability).collect();
    assert_eq!(annual, vec![Decimal::ZERO, decimal("5000"), decimal("10000")]);
    assert_eq!(plans[2].monthly_installment, decimal("3333"));
    assert!(plans
        .iter()
        .all(|p| p.monthly_installment * Decimal::from(p.months) <= p.annual_liability));
}

#[test]
fn test_commit_installments_from_run_gross() {
    let config = load_config();
    let employees = vec![
        salaried("emp_001", "250000", "UG"),
        salaried("emp_002", "90000", "UG"),
    ];
    let mut run = generate_pay_run("July", july(), &employees, None, &config).unwrap();
    let net_before = run.item("emp_001").unwrap().net_pay;

    let plans = plan_run_installments(
        &run,
        &LevyMethod::BracketLookup,
        3,
        &InstallmentScope::Threshold {
            minimum: decimal("100000"),
        },
        &config,
    )
    .unwrap();
    assert_eq!(plans.len(), 1);

    let committed = commit_installments(&mut run, &plans, &config).unwrap();

    assert_eq!(committed, 1);
    let item = run.item("emp_001").unwrap();
    assert_eq!(item.net_pay, net_before - decimal("3333"));
    assert_eq!(item.recurring_adjustments()[0].name, "Local Service Tax");

    let carried = run.recurring_adjustments();
    let august = generate_pay_run("August", july(), &employees, Some(&carried), &config).unwrap();
    assert_eq!(august.item("emp_001").unwrap().net_pay, item.net_pay);
}

// =============================================================================
// SECTION 5: Pay Run Lifecycle
// =============================================================================

#[test]
fn test_pay_run_totals_and_lifecycle() {
    let config = load_config();
    let mut expat = salaried("emp_003", "1000000", "KE");
    expat.employee_type = EmployeeType::Expatriate;
    let employees = vec![
        salaried("emp_001", "600000", "UG"),
        salaried("emp_002", "100000", "KE"),
        expat,
    ];

    let mut run = generate_pay_run("July", july(), &employees, None, &config).unwrap();

    assert_eq!(run.totals.employee_count, 3);
    assert_eq!(run.totals.total_gross_pay, decimal("1700000"));
    assert_eq!(run.totals.total_deductions, decimal("295353.35"));
    assert_eq!(run.totals.total_net_pay, decimal("1404646.65"));
    assert_eq!(run.totals.total_employer_contributions, decimal("65820"));

    run.transition_to(PayRunStatus::Pending).unwrap();
    add_custom_adjustment(
        &mut run,
        "emp_001",
        CustomAdjustment::new("Bonus", decimal("10000"), AdjustmentKind::Allowance),
        &config,
    )
    .unwrap();
    assert_eq!(run.totals.total_net_pay, decimal("1414646.65"));

    run.transition_to(PayRunStatus::Approved).unwrap();
    let locked = recalculate_pay_run(&mut run, &config);
    assert!(matches!(locked, Err(EngineError::PayRunLocked { .. })));

    run.transition_to(PayRunStatus::Paid).unwrap();
    let invalid = run.transition_to(PayRunStatus::Draft);
    assert!(matches!(invalid, Err(EngineError::InvalidStatusTransition { .. })));
}

// =============================================================================
// SECTION 6: HTTP Endpoints
// =============================================================================

#[tokio::test]
async fn test_http_calculate_scenario() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/calculate",
        json!({
            "employee": {
                "id": "emp_001",
                "pay_type": "hourly",
                "pay_rate": "5000",
                "country": "ZZ",
                "employee_type": "local",
                "hours_worked": "10"
            },
            "custom_adjustments": [
                { "name": "Medical", "amount": "10000", "type": "benefit" }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_decimal_field(&result, "base_gross_pay", "50000");
    assert_decimal_field(&result, "gross_pay", "60000");
    assert_decimal_field(&result, "net_pay", "60000");
    assert_eq!(result["estimated"], json!(false));
    assert!(!result["audit_trace"]["steps"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_http_calculate_unrecognized_pay_type_uses_rate() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/calculate",
        json!({
            "employee": {
                "id": "emp_002",
                "pay_type": "commission",
                "pay_rate": "300000",
                "country": "UG",
                "employee_type": "local"
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_decimal_field(&result, "base_gross_pay", "300000");
    let warnings = result["audit_trace"]["warnings"].as_array().unwrap();
    assert!(warnings.iter().any(|w| w["code"] == "UNKNOWN_PAY_TYPE"));
}

#[tokio::test]
async fn test_http_installment_preview_with_selected_scope() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/installments/preview",
        json!({
            "candidates": [
                { "employee_id": "emp_001", "basis": "250000" },
                { "employee_id": "emp_002", "basis": "650000" }
            ],
            "method": { "type": "bracket_lookup" },
            "months": 2,
            "scope": { "type": "selected", "employee_ids": ["emp_002"] }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let plans = result["plans"].as_array().unwrap();
    assert_eq!(plans.len(), 1);
    assert_decimal_field(&plans[0], "annual_liability", "60000");
    assert_decimal_field(&plans[0], "monthly_installment", "30000");
}

#[tokio::test]
async fn test_http_installment_preview_invalid_months() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/installments/preview",
        json!({
            "candidates": [],
            "method": { "type": "fixed_amount", "amount": "5000" },
            "months": 0
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(result["code"], "INVALID_INSTALLMENT_MONTHS");
}

#[tokio::test]
async fn test_http_pay_run_generation() {
    let (status, result) = post_json(
        create_router_for_test(),
        "/pay-runs",
        json!({
            "name": "July 2026",
            "pay_period": { "start_date": "2026-07-01", "end_date": "2026-07-31" },
            "employees": [
                {
                    "id": "emp_001",
                    "pay_type": "salary",
                    "pay_rate": "600000",
                    "country": "UG",
                    "employee_type": "local"
                },
                {
                    "id": "emp_002",
                    "pay_type": "salary",
                    "pay_rate": "100000",
                    "country": "UG",
                    "employee_type": "local",
                    "active": false
                }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(result["status"], "draft");
    assert_eq!(result["items"].as_array().unwrap().len(), 1);
    assert_decimal_field(&result["totals"], "total_net_pay", "488000");
    assert_decimal_field(&result["totals"], "total_employer_contributions", "60000");
}

#[tokio::test]
async fn test_http_missing_content_type() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

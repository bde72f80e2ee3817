//! HTTP request handlers for the payroll engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    calculate_pay, employee_levy_candidates, estimate_pay, generate_pay_run, plan_installments,
    validate_adjustment, validate_benefit_deductions,
};
use crate::error::EngineError;
use crate::models::Employee;

use super::request::{CalculationRequest, InstallmentPreviewRequest, PayRunRequest};
use super::response::{ApiError, ApiErrorResponse, InstallmentPreviewResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/installments/preview", post(installment_preview_handler))
        .route("/pay-runs", post(pay_run_handler))
        .with_state(state)
}

/// Handler for POST /calculate endpoint.
///
/// Returns the full pay breakdown for one employee. A failed calculation
/// still answers 200 with an estimate flagged `estimated: true`.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let validation = request
        .custom_adjustments
        .iter()
        .try_for_each(validate_adjustment)
        .and_then(|()| validate_benefit_deductions(request.benefit_deductions));
    if let Err(err) = validation {
        return engine_error(err, correlation_id);
    }

    let employee: Employee = request.employee.into();
    let config = state.config();

    let start_time = Instant::now();
    let result = calculate_pay(
        &employee,
        employee.hours_worked,
        employee.pieces_completed,
        &request.custom_adjustments,
        request.benefit_deductions,
        config,
    )
    .unwrap_or_else(|err| {
        estimate_pay(
            &employee,
            employee.hours_worked,
            employee.pieces_completed,
            &request.custom_adjustments,
            request.benefit_deductions,
            config,
            &err,
        )
    });

    info!(
        correlation_id = %correlation_id,
        employee_id = %employee.id,
        gross_pay = %result.gross_pay,
        net_pay = %result.net_pay,
        estimated = result.estimated,
        duration_us = start_time.elapsed().as_micros(),
        "Calculation completed"
    );
    json_ok(&result)
}

/// Handler for POST /installments/preview endpoint.
///
/// Candidates may be sent with an explicit basis, or as employees whose
/// basis is their calculated gross pay.
async fn installment_preview_handler(
    State(state): State<AppState>,
    payload: Result<Json<InstallmentPreviewRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing installment preview request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let config = state.config();
    let mut candidates = request.candidates;
    let employees: Vec<Employee> = request.employees.into_iter().map(Into::into).collect();
    candidates.extend(employee_levy_candidates(&employees, config));

    let levy = config.levy();
    match plan_installments(
        &candidates,
        levy,
        &request.method,
        request.months,
        &request.scope,
    ) {
        Ok(plans) => {
            info!(
                correlation_id = %correlation_id,
                planned = plans.len(),
                months = request.months,
                "Installment preview completed"
            );
            json_ok(&InstallmentPreviewResponse {
                levy: levy.name.clone(),
                months: request.months,
                plans,
            })
        }
        Err(err) => engine_error(err, correlation_id),
    }
}

/// Handler for POST /pay-runs endpoint.
async fn pay_run_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayRunRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing pay run request");

    let request = match parse_body(payload, correlation_id) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let employees: Vec<Employee> = request.employees.into_iter().map(Into::into).collect();
    let start_time = Instant::now();

    match generate_pay_run(
        request.name,
        request.pay_period.into(),
        &employees,
        None,
        state.config(),
    ) {
        Ok(run) => {
            info!(
                correlation_id = %correlation_id,
                pay_run = %run.id,
                employees = run.totals.employee_count,
                total_net_pay = %run.totals.total_net_pay,
                duration_us = start_time.elapsed().as_micros(),
                "Pay run generated"
            );
            (StatusCode::CREATED, [(header::CONTENT_TYPE, "application/json")], Json(run))
                .into_response()
        }
        Err(err) => engine_error(err, correlation_id),
    }
}

/// Unwraps a JSON body or builds the 400 response for it.
fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };

    Err((
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        Json(error),
    )
        .into_response())
}

fn engine_error(err: EngineError, correlation_id: Uuid) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}

fn json_ok<T: Serialize>(body: &T) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], Json(body)).into_response()
}

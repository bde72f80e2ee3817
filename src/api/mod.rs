//! HTTP API module for the payroll engine.
//!
//! This module provides thin REST endpoints over the calculation core:
//! single-employee calculation, levy installment previews and pay run
//! generation.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    CalculationRequest, EmployeeRequest, InstallmentPreviewRequest, PayPeriodRequest, PayRunRequest,
};
pub use response::{ApiError, ApiErrorResponse, InstallmentPreviewResponse};
pub use state::AppState;

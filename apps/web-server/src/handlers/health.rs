//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use yatube_core::ports::GroupRepository;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
}

/// Health check endpoint - returns server status.
///
/// GET /health/
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let (status, storage) = match state.groups.list_all().await {
        Ok(_) => ("ok", "up"),
        Err(e) => {
            tracing::error!(error = %e, "Health check could not reach storage");
            ("degraded", "down")
        }
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        storage,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    match status {
        "ok" => HttpResponse::Ok().json(response),
        _ => HttpResponse::ServiceUnavailable().json(response),
    }
}

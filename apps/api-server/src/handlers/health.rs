//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// Seconds since the server started.
    pub uptime: f64,
    pub message: &'static str,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Health check endpoint - returns server status.
///
/// GET /api/v1/healthcheck
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        uptime: state.started_at.elapsed().as_secs_f64(),
        message: "OK",
        timestamp: chrono::Utc::now().timestamp_millis(),
    };

    HttpResponse::Ok().json(response)
}

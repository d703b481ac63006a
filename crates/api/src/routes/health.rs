//! Liveness and readiness checks for the load balancer.
//!
//! `/health` answers as long as the process serves requests. `/health/ready`
//! also pings the database, and answers 503 until it is reachable.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

const SERVICE: &str = "mealcard";

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    /// Always `healthy` when served.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
}

/// Readiness response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// `ready` or `degraded`.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// `up` or `unreachable`.
    pub database: &'static str,
}

async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "healthy",
        service: SERVICE,
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready",
                service: SERVICE,
                database: "up",
            }),
        ),
        Err(e) => {
            warn!(error = %e, "Readiness check failed: database unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "degraded",
                    service: SERVICE,
                    database: "unreachable",
                }),
            )
        }
    }
}

/// Creates the health routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(liveness))
        .route("/health/ready", get(readiness))
}

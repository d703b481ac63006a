//! Manager routes: dispose of recharge requests, view analytics.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use mealcard_core::analytics::TimeWindow;
use mealcard_core::recharge::RechargeStatus;
use mealcard_shared::types::RechargeRequestId;
use serde::Deserialize;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the manager routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/manager/recharge-requests", get(list_requests))
        .route(
            "/manager/recharge-requests/{id}/approve",
            post(approve_request),
        )
        .route("/manager/recharge-requests/{id}/reject", post(reject_request))
        .route("/manager/analytics", get(analytics))
}

/// Query parameters for listing requests.
#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    /// `pending`, `approved` or `rejected`. All statuses when absent.
    pub status: Option<String>,
}

/// Query parameters for analytics. Both bounds or neither.
#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// Inclusive start.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive end.
    pub to: Option<DateTime<Utc>>,
}

/// GET `/manager/recharge-requests` - List requests, optionally by status.
async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            RechargeStatus::parse(s)
                .ok_or_else(|| ApiError::invalid_input(format!("Unknown status: {s}")))
        })
        .transpose()?;

    let requests = state.recharge().list_by_status(status).await?;
    Ok(Json(requests))
}

/// POST `/manager/recharge-requests/{id}/approve` - Approve and credit the card.
async fn approve_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RechargeRequestId>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.recharge().approve(id, auth.user_id()).await?;
    Ok(Json(outcome))
}

/// POST `/manager/recharge-requests/{id}/reject` - Reject without touching the ledger.
async fn reject_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<RechargeRequestId>,
) -> Result<impl IntoResponse, ApiError> {
    let request = state.recharge().reject(id, auth.user_id()).await?;
    Ok(Json(request))
}

/// GET `/manager/analytics` - Rollup for a window, today by default.
async fn analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.analytics();
    let window = match (query.from, query.to) {
        (Some(from), Some(to)) => TimeWindow::new(from, to)?,
        (None, None) => service.today_window(),
        _ => return Err(ApiError::invalid_input("Both from and to are required")),
    };

    let snapshot = service.snapshot(window).await?;
    Ok(Json(snapshot.as_ref().clone()))
}

//! Student routes: own card, own history, recharge requests.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use mealcard_core::recharge::NewRechargeRequest;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the student routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/student/card", get(get_card))
        .route("/student/transactions", get(list_transactions))
        .route(
            "/student/recharge-requests",
            get(list_requests).post(submit_request),
        )
}

/// GET `/student/card` - The caller's card.
async fn get_card(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.ledger().card_for_student(auth.user_id()).await?;
    Ok(Json(card))
}

/// GET `/student/transactions` - The caller's history, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let statement = state.ledger().student_statement(auth.user_id()).await?;
    Ok(Json(statement.records))
}

/// POST `/student/recharge-requests` - Submit a recharge request.
async fn submit_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<NewRechargeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = state.recharge().submit(auth.user_id(), body).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET `/student/recharge-requests` - The caller's requests, newest first.
async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let requests = state.recharge().list_for_student(auth.user_id()).await?;
    Ok(Json(requests))
}

//! Admin routes: card provisioning, the transaction feed, the dashboard.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use mealcard_core::ledger::{
    BulkOpenOutcome, Card, DEFAULT_FEED_LIMIT, TransactionKind, TransactionQuery,
};
use mealcard_shared::types::{CardId, UserId};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Upper bound on records returned by one feed request.
const MAX_FEED_LIMIT: u64 = 1000;

/// Upper bound on students in one bulk provisioning request.
const MAX_BULK_CARDS: usize = 500;

/// Creates the admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/cards", post(open_card))
        .route("/admin/cards/bulk", post(open_cards))
        .route("/admin/cards/{id}", patch(update_card).get(get_statement))
        .route("/admin/transactions", get(list_transactions))
        .route("/admin/dashboard", get(dashboard))
}

/// Request body for opening a card.
#[derive(Debug, Deserialize)]
pub struct OpenCardRequest {
    /// Student who will own the card.
    pub student_id: UserId,
}

/// Request body for bulk provisioning.
#[derive(Debug, Deserialize)]
pub struct BulkOpenRequest {
    /// Students to open cards for, processed in order.
    pub student_ids: Vec<UserId>,
}

/// One failed entry of a bulk request.
#[derive(Debug, Serialize)]
pub struct BulkOpenFailure {
    /// The student whose card was not opened.
    pub student_id: UserId,
    /// Error code, as in a single-card response.
    pub error: &'static str,
    /// Human-readable reason.
    pub message: String,
}

/// Response body for bulk provisioning.
#[derive(Debug, Default, Serialize)]
pub struct BulkOpenResponse {
    /// Cards opened, in request order.
    pub success: Vec<Card>,
    /// Entries that failed, in request order.
    pub errors: Vec<BulkOpenFailure>,
}

impl From<Vec<BulkOpenOutcome>> for BulkOpenResponse {
    fn from(outcomes: Vec<BulkOpenOutcome>) -> Self {
        let mut response = Self::default();
        for outcome in outcomes {
            match outcome.result {
                Ok(card) => response.success.push(card),
                Err(e) => response.errors.push(BulkOpenFailure {
                    student_id: outcome.student_id,
                    error: e.error_code(),
                    message: e.to_string(),
                }),
            }
        }
        response
    }
}

/// Request body for updating a card.
#[derive(Debug, Deserialize)]
pub struct UpdateCardRequest {
    /// New activation state.
    pub is_active: bool,
}

/// Query parameters for the transaction feed.
#[derive(Debug, Deserialize)]
pub struct TransactionFeedQuery {
    /// Only records for this card.
    pub card_id: Option<CardId>,
    /// `recharge` or `purchase`.
    pub kind: Option<String>,
    /// Inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub to: Option<DateTime<Utc>>,
    /// Page size (default 100, max 1000).
    pub limit: Option<u64>,
}

/// POST `/admin/cards` - Open a card for a student.
async fn open_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<OpenCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state
        .ledger()
        .open_card(body.student_id, Some(auth.user_id()))
        .await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// POST `/admin/cards/bulk` - Open cards for many students.
///
/// Always 200 once the batch is accepted; per-student failures are listed
/// under `errors` and do not stop the rest of the batch.
async fn open_cards(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<BulkOpenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.student_ids.is_empty() {
        return Err(ApiError::invalid_input("student_ids must not be empty"));
    }
    if body.student_ids.len() > MAX_BULK_CARDS {
        return Err(ApiError::invalid_input(format!(
            "At most {MAX_BULK_CARDS} students per request"
        )));
    }

    let outcomes = state
        .ledger()
        .open_cards(&body.student_ids, Some(auth.user_id()))
        .await;
    Ok(Json(BulkOpenResponse::from(outcomes)))
}

/// PATCH `/admin/cards/{id}` - Activate or deactivate a card.
async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<CardId>,
    Json(body): Json<UpdateCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.ledger().set_card_active(id, body.is_active).await?;
    Ok(Json(card))
}

/// GET `/admin/cards/{id}` - A card with its full history.
async fn get_statement(
    State(state): State<AppState>,
    Path(id): Path<CardId>,
) -> Result<impl IntoResponse, ApiError> {
    let statement = state.ledger().statement(id).await?;
    Ok(Json(statement))
}

/// GET `/admin/transactions` - Transaction feed, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionFeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = query
        .kind
        .as_deref()
        .map(|k| {
            TransactionKind::parse(k)
                .ok_or_else(|| ApiError::invalid_input(format!("Unknown kind: {k}")))
        })
        .transpose()?;

    let filter = TransactionQuery {
        card_id: query.card_id,
        kind,
        from: query.from,
        to: query.to,
        limit: Some(query.limit.unwrap_or(DEFAULT_FEED_LIMIT).min(MAX_FEED_LIMIT)),
    };

    let records = state.ledger().list_transactions(&filter).await?;
    Ok(Json(records))
}

/// GET `/admin/dashboard` - Card totals and today's activity.
async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let summary = state.analytics().dashboard().await?;
    Ok(Json(summary))
}

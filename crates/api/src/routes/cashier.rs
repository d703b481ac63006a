//! Cashier routes: counter purchases and card lookup.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use mealcard_shared::types::MenuItemId;
use serde::Deserialize;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the cashier routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cashier/purchase", post(purchase))
        .route("/cashier/cards/{number}", get(get_card))
}

/// Request body for a purchase.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    /// Card number presented at the counter.
    pub card_number: String,
    /// Item sold.
    pub item_id: MenuItemId,
}

/// POST `/cashier/purchase` - Debit a card for one menu item.
async fn purchase(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<PurchaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card_number = body.card_number.trim();
    if card_number.is_empty() {
        return Err(ApiError::invalid_input("card_number is required"));
    }

    let receipt = state
        .purchase()
        .purchase(card_number, body.item_id, auth.user_id())
        .await?;
    Ok(Json(receipt))
}

/// GET `/cashier/cards/{number}` - Look up a card before selling.
async fn get_card(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.ledger().card_by_number(&number).await?;
    Ok(Json(card))
}

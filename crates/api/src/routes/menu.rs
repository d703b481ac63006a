//! Menu routes. Reading the available menu needs only a valid token;
//! catalog management is admin-only.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use mealcard_core::catalog::{MenuItemPatch, NewMenuItem};
use mealcard_shared::types::MenuItemId;

use crate::{AppState, error::ApiError};

/// Routes open to every authenticated role.
pub fn routes() -> Router<AppState> {
    Router::new().route("/menu", get(list_available))
}

/// Catalog management routes. Mounted behind the admin guard.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/menu", get(list_all).post(create_item))
        .route(
            "/admin/menu/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
}

/// GET `/menu` - Items that can be sold now.
async fn list_available(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state.catalog().list(true).await?;
    Ok(Json(items))
}

/// GET `/admin/menu` - Every item, including unavailable ones.
async fn list_all(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state.catalog().list(false).await?;
    Ok(Json(items))
}

/// POST `/admin/menu` - Create an item.
async fn create_item(
    State(state): State<AppState>,
    Json(body): Json<NewMenuItem>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.catalog().create(body).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET `/admin/menu/{id}` - Get an item.
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<MenuItemId>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.catalog().get(id).await?;
    Ok(Json(item))
}

/// PATCH `/admin/menu/{id}` - Update an item.
async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<MenuItemId>,
    Json(patch): Json<MenuItemPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.catalog().update(id, patch).await?;
    Ok(Json(item))
}

/// DELETE `/admin/menu/{id}` - Delete an item.
async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<MenuItemId>,
) -> Result<impl IntoResponse, ApiError> {
    state.catalog().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//! API route definitions.
//!
//! Every route except the health checks requires a bearer token. Role groups are
//! guarded with `route_layer` so unmatched paths still fall through to 404.

use axum::{Router, middleware};

use crate::AppState;
use crate::middleware::{
    auth_middleware, require_admin, require_cashier, require_manager, require_student,
};

pub mod admin;
pub mod cashier;
pub mod health;
pub mod manager;
pub mod menu;
pub mod student;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let student_routes = student::routes().route_layer(middleware::from_fn(require_student));
    let manager_routes = manager::routes().route_layer(middleware::from_fn(require_manager));
    let cashier_routes = cashier::routes().route_layer(middleware::from_fn(require_cashier));
    let admin_routes = admin::routes()
        .merge(menu::admin_routes())
        .route_layer(middleware::from_fn(require_admin));

    let protected_routes = Router::new()
        .merge(menu::routes())
        .merge(student_routes)
        .merge(manager_routes)
        .merge(cashier_routes)
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(protected_routes)
}

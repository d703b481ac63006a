//! Authentication and role guards for protected routes.
//!
//! `auth_middleware` verifies the bearer token and stores the claims in the
//! request extensions. The `require_*` guards then admit only the listed
//! roles. An unrecognised role in an otherwise valid token is rejected as
//! invalid input rather than as forbidden.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mealcard_shared::types::UserId;
use mealcard_shared::{AppError, Claims, JwtError, Role};

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return ApiError::unauthorized(
            "MISSING_TOKEN",
            "Authorization header with Bearer token is required",
        )
        .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(JwtError::Expired) => {
            ApiError::unauthorized("TOKEN_EXPIRED", "Token has expired").into_response()
        }
        Err(_) => {
            ApiError::unauthorized("INVALID_TOKEN", "Invalid or malformed token").into_response()
        }
    }
}

/// Admits the request if the caller holds one of `allowed`.
async fn guard(allowed: &[Role], request: Request, next: Next) -> Response {
    let role = match request.extensions().get::<Claims>() {
        Some(claims) => claims.role().ok_or_else(|| claims.role.clone()),
        None => {
            return ApiError::unauthorized("UNAUTHORIZED", "Authentication required")
                .into_response();
        }
    };

    match role {
        Ok(role) if allowed.contains(&role) => next.run(request).await,
        Ok(role) => {
            ApiError::forbidden(format!("Role {role} may not access this resource")).into_response()
        }
        Err(raw) => ApiError::from(AppError::Validation(format!("Unknown role: {raw}")))
            .into_response(),
    }
}

/// Students (and admins).
pub async fn require_student(request: Request, next: Next) -> Response {
    guard(&[Role::Student, Role::Admin], request, next).await
}

/// Managers and admins.
pub async fn require_manager(request: Request, next: Next) -> Response {
    guard(&[Role::Manager, Role::Admin], request, next).await
}

/// Cashiers and admins.
pub async fn require_cashier(request: Request, next: Next) -> Response {
    guard(&[Role::Cashier, Role::Admin], request, next).await
}

/// Admins only.
pub async fn require_admin(request: Request, next: Next) -> Response {
    guard(&[Role::Admin], request, next).await
}

/// Extractor for authenticated user claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the acting user's ID.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0.user_id()
    }

    /// Returns the user's role, if recognised.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.0.role()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("UNAUTHORIZED", "Authentication required"))
    }
}

//! Error responses.
//!
//! Every failure leaves the API as `{"error": CODE, "message": ..., "retryable": bool}`
//! with the status derived from the domain error kind.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mealcard_core::analytics::AnalyticsError;
use mealcard_core::catalog::CatalogError;
use mealcard_core::ledger::LedgerError;
use mealcard_core::purchase::PurchaseError;
use mealcard_core::recharge::RechargeError;
use mealcard_shared::{AppError, ErrorKind};
use serde_json::json;

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 401 with the given code.
    #[must_use]
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    /// 403 for an authenticated actor lacking the required role.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    /// 400 for malformed input.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    /// Returns the HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    fn from_domain(kind: ErrorKind, code: &'static str, message: String) -> Self {
        let status = StatusCode::from_u16(kind.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, code, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retryable = self.status == StatusCode::SERVICE_UNAVAILABLE;
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
                "retryable": retryable,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, err.error_code(), err.to_string())
    }
}

macro_rules! domain_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ApiError {
                fn from(err: $ty) -> Self {
                    Self::from_domain(err.kind(), err.error_code(), err.to_string())
                }
            }
        )*
    };
}

domain_error!(
    LedgerError,
    RechargeError,
    CatalogError,
    PurchaseError,
    AnalyticsError,
);

#[cfg(test)]
mod tests {
    use super::*;
    use mealcard_core::ledger::CardLookup;
    use mealcard_core::recharge::RechargeStatus;
    use mealcard_shared::types::{CardId, Credits, RechargeRequestId};

    #[test]
    fn test_insufficient_funds_is_conflict() {
        let err: ApiError = LedgerError::InsufficientFunds {
            card_id: CardId::new(),
            balance: Credits::new(10),
            requested: Credits::new(50),
        }
        .into();

        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "INSUFFICIENT_FUNDS");
    }

    #[test]
    fn test_store_unavailable_is_service_unavailable() {
        let err: ApiError = LedgerError::StoreUnavailable("pool timed out".to_string()).into();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_request_not_pending_is_conflict() {
        let err: ApiError = RechargeError::RequestNotPending {
            id: RechargeRequestId::new(),
            status: RechargeStatus::Approved,
        }
        .into();

        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "REQUEST_NOT_PENDING");
    }

    #[test]
    fn test_nested_purchase_error_keeps_inner_code() {
        let lookup = CardLookup::Number("CARD42".to_string());
        let err: ApiError = PurchaseError::from(LedgerError::CardNotFound(lookup)).into();

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "CARD_NOT_FOUND");
    }
}

//! Recharge workflow error types.

use mealcard_shared::types::{Credits, RechargeRequestId};
use mealcard_shared::{AppError, ErrorKind};
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::recharge::types::RechargeStatus;

/// Errors that can occur during recharge workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RechargeError {
    /// Requested amount is not positive.
    #[error("Invalid recharge amount {0}: must be positive")]
    InvalidAmount(Credits),

    /// Request does not exist.
    #[error("Recharge request {0} not found")]
    RequestNotFound(RechargeRequestId),

    /// Request was already decided.
    #[error("Recharge request {id} is {status}, not pending")]
    RequestNotPending {
        /// The request.
        id: RechargeRequestId,
        /// Its current status.
        status: RechargeStatus,
    },

    /// Card lookup or settlement failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Store could not be reached or timed out. Safe to retry.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl RechargeError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_) => ErrorKind::InvalidInput,
            Self::RequestNotFound(_) => ErrorKind::NotFound,
            Self::RequestNotPending { .. } => ErrorKind::Conflict,
            Self::Ledger(e) => e.kind(),
            Self::StoreUnavailable(_) => ErrorKind::Transient,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Self::RequestNotPending { .. } => "REQUEST_NOT_PENDING",
            Self::Ledger(e) => e.error_code(),
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }
}

impl From<RechargeError> for AppError {
    fn from(err: RechargeError) -> Self {
        Self::from_kind(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealcard_shared::types::CardId;

    #[test]
    fn test_not_pending_is_conflict() {
        let err = RechargeError::RequestNotPending {
            id: RechargeRequestId::new(),
            status: RechargeStatus::Approved,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "REQUEST_NOT_PENDING");
        assert!(err.to_string().contains("is approved"));
    }

    #[test]
    fn test_ledger_error_passes_through() {
        let err: RechargeError = LedgerError::CardInactive(CardId::new()).into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.error_code(), "CARD_INACTIVE");

        let transient: RechargeError = LedgerError::StoreUnavailable("down".into()).into();
        assert!(transient.kind().is_retryable());
    }

    #[test]
    fn test_invalid_amount() {
        let err = RechargeError::InvalidAmount(Credits::new(-5));
        assert_eq!(err.status_code(), 400);
        let app: AppError = err.into();
        assert_eq!(app.status_code(), 400);
    }
}

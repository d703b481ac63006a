//! Ledger error types.
//!
//! Every settlement failure is scoped to the single requested operation.
//! Only `StoreUnavailable` may be retried by the caller.

use mealcard_shared::types::{CardId, Credits, UserId};
use mealcard_shared::{AppError, ErrorKind};
use thiserror::Error;

use crate::ledger::types::CardLookup;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Card does not exist.
    #[error("{0} not found")]
    CardNotFound(CardLookup),

    /// Card is deactivated and cannot be settled against.
    #[error("Card {0} is inactive")]
    CardInactive(CardId),

    /// Student already owns a card.
    #[error("Student {0} already has a card")]
    CardAlreadyExists(UserId),

    /// Generated card number collides with an existing card.
    #[error("Card number {0} is already taken")]
    CardNumberTaken(String),

    /// Debit would drive the balance below zero.
    #[error("Insufficient funds on card {card_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// The card.
        card_id: CardId,
        /// Balance at the moment the debit was applied.
        balance: Credits,
        /// Debit amount (positive).
        requested: Credits,
    },

    /// Zero amount, sign disagreeing with the kind, or arithmetic overflow.
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount {
        /// The rejected amount.
        amount: Credits,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Store could not be reached or timed out. Safe to retry.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl LedgerError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CardNotFound(_) => ErrorKind::NotFound,
            Self::InvalidAmount { .. } => ErrorKind::InvalidInput,
            Self::CardInactive(_)
            | Self::CardAlreadyExists(_)
            | Self::CardNumberTaken(_)
            | Self::InsufficientFunds { .. } => ErrorKind::Conflict,
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
            Self::CardNotFound(_) => "CARD_NOT_FOUND",
            Self::CardInactive(_) => "CARD_INACTIVE",
            Self::CardAlreadyExists(_) => "CARD_ALREADY_EXISTS",
            Self::CardNumberTaken(_) => "CARD_NUMBER_TAKEN",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::InvalidAmount { .. } => "INVALID_AMOUNT",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        Self::from_kind(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_not_found_error() {
        let err = LedgerError::CardNotFound(CardLookup::Number("CARD42".to_string()));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "CARD_NOT_FOUND");
        assert_eq!(err.to_string(), "card number CARD42 not found");
    }

    #[test]
    fn test_insufficient_funds_error() {
        let err = LedgerError::InsufficientFunds {
            card_id: CardId::new(),
            balance: Credits::new(100),
            requested: Credits::new(150),
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.status_code(), 409);
        assert!(err.to_string().contains("balance 100"));
        assert!(err.to_string().contains("requested 150"));
        assert!(!err.kind().is_retryable());
    }

    #[test]
    fn test_card_inactive_error() {
        let err = LedgerError::CardInactive(CardId::new());
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.error_code(), "CARD_INACTIVE");
    }

    #[test]
    fn test_number_collision_is_not_a_duplicate_student() {
        let err = LedgerError::CardNumberTaken("CARD1700000000000-abc123xyz".to_string());
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.error_code(), "CARD_NUMBER_TAKEN");
        assert_ne!(err.error_code(), "CARD_ALREADY_EXISTS");
        assert_eq!(
            err.to_string(),
            "Card number CARD1700000000000-abc123xyz is already taken"
        );
    }

    #[test]
    fn test_invalid_amount_error() {
        let err = LedgerError::InvalidAmount {
            amount: Credits::ZERO,
            reason: "amount must be non-zero",
        };
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_store_unavailable_is_retryable() {
        let err = LedgerError::StoreUnavailable("pool timed out".to_string());
        assert_eq!(err.status_code(), 503);
        assert!(err.kind().is_retryable());
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = LedgerError::CardInactive(CardId::new()).into();
        assert_eq!(app.status_code(), 409);
        assert_eq!(app.error_code(), "CONFLICT");
    }
}

//! Purchase error types.

use mealcard_shared::{AppError, ErrorKind};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::ledger::LedgerError;

/// Errors that can occur on the purchase path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    /// Card lookup or settlement failed, including `InsufficientFunds`.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Item lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl PurchaseError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(e) => e.kind(),
            Self::Catalog(e) => e.kind(),
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
            Self::Ledger(e) => e.error_code(),
            Self::Catalog(e) => e.error_code(),
        }
    }
}

impl From<PurchaseError> for AppError {
    fn from(err: PurchaseError) -> Self {
        Self::from_kind(err.kind(), err.to_string())
    }
}

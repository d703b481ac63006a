//! Analytics error types.

use chrono::{DateTime, Utc};
use mealcard_shared::{AppError, ErrorKind};
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::recharge::RechargeError;

/// Errors that can occur while computing analytics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// Window start is not before its end.
    #[error("Invalid window: {start} is not before {end}")]
    InvalidWindow {
        /// Requested start.
        start: DateTime<Utc>,
        /// Requested end.
        end: DateTime<Utc>,
    },

    /// Reading the log failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Reading request counts failed.
    #[error(transparent)]
    Recharge(#[from] RechargeError),
}

impl AnalyticsError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidWindow { .. } => ErrorKind::InvalidInput,
            Self::Ledger(e) => e.kind(),
            Self::Recharge(e) => e.kind(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidWindow { .. } => "INVALID_WINDOW",
            Self::Ledger(e) => e.error_code(),
            Self::Recharge(e) => e.error_code(),
        }
    }
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        Self::from_kind(err.kind(), err.to_string())
    }
}

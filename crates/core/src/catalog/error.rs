//! Catalog error types.

use mealcard_shared::types::{Credits, MenuItemId};
use mealcard_shared::{AppError, ErrorKind};
use thiserror::Error;

/// Errors that can occur during catalog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Item does not exist.
    #[error("Menu item {0} not found")]
    ItemNotFound(MenuItemId),

    /// Item exists but is not currently sold.
    #[error("Menu item {0} is not available")]
    ItemUnavailable(MenuItemId),

    /// Price is not positive.
    #[error("Invalid price {0}: must be positive")]
    InvalidPrice(Credits),

    /// Name or category is blank.
    #[error("Invalid menu item: {0}")]
    InvalidItem(&'static str),

    /// Store could not be reached or timed out. Safe to retry.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl CatalogError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ItemNotFound(_) => ErrorKind::NotFound,
            Self::ItemUnavailable(_) => ErrorKind::Conflict,
            Self::InvalidPrice(_) | Self::InvalidItem(_) => ErrorKind::InvalidInput,
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
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::ItemUnavailable(_) => "ITEM_UNAVAILABLE",
            Self::InvalidPrice(_) => "INVALID_PRICE",
            Self::InvalidItem(_) => "INVALID_ITEM",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        Self::from_kind(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CatalogError::ItemNotFound(MenuItemId::new()), 404)]
    #[case(CatalogError::ItemUnavailable(MenuItemId::new()), 409)]
    #[case(CatalogError::InvalidPrice(Credits::ZERO), 400)]
    #[case(CatalogError::InvalidItem("name is required"), 400)]
    #[case(CatalogError::StoreUnavailable("timeout".into()), 503)]
    fn test_status_codes(#[case] err: CatalogError, #[case] status: u16) {
        assert_eq!(err.status_code(), status);
    }
}

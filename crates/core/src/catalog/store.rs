//! Persistence seam for the menu catalog.

use std::future::Future;

use mealcard_shared::types::MenuItemId;

use super::error::CatalogError;
use super::types::{MenuItem, MenuItemPatch};

/// Store trait for menu items.
pub trait CatalogStore: Send + Sync {
    /// Persists a new item.
    fn insert_item(
        &self,
        item: MenuItem,
    ) -> impl Future<Output = Result<MenuItem, CatalogError>> + Send;

    /// Finds an item by ID.
    fn find_item(
        &self,
        id: MenuItemId,
    ) -> impl Future<Output = Result<Option<MenuItem>, CatalogError>> + Send;

    /// Applies a patch and returns the updated item.
    fn update_item(
        &self,
        id: MenuItemId,
        patch: MenuItemPatch,
    ) -> impl Future<Output = Result<MenuItem, CatalogError>> + Send;

    /// Deletes an item. Returns false if it did not exist.
    fn delete_item(&self, id: MenuItemId) -> impl Future<Output = Result<bool, CatalogError>> + Send;

    /// Lists items ordered by category then name.
    fn list_items(
        &self,
        available_only: bool,
    ) -> impl Future<Output = Result<Vec<MenuItem>, CatalogError>> + Send;
}

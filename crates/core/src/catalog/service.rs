//! Catalog service.

use std::sync::Arc;

use mealcard_shared::types::{Credits, MenuItemId};
use tracing::info;

use super::error::CatalogError;
use super::store::CatalogStore;
use super::types::{MenuItem, MenuItemPatch, NewMenuItem};

/// Menu catalog service.
pub struct CatalogService<C: CatalogStore> {
    store: Arc<C>,
}

impl<C: CatalogStore> CatalogService<C> {
    /// Creates a catalog service.
    #[must_use]
    pub fn new(store: Arc<C>) -> Self {
        Self { store }
    }

    /// Creates an item.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPrice` or `InvalidItem` on bad input.
    pub async fn create(&self, input: NewMenuItem) -> Result<MenuItem, CatalogError> {
        validate_price(input.price)?;
        validate_text(&input.name, "name is required")?;
        validate_text(&input.category, "category is required")?;

        let item = self.store.insert_item(input.into_item()).await?;
        info!(item_id = %item.id, name = %item.name, price = %item.price, "Menu item created");
        Ok(item)
    }

    /// Updates an item.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound`, `InvalidPrice` or `InvalidItem`.
    pub async fn update(
        &self,
        id: MenuItemId,
        patch: MenuItemPatch,
    ) -> Result<MenuItem, CatalogError> {
        if let Some(price) = patch.price {
            validate_price(price)?;
        }
        if let Some(name) = &patch.name {
            validate_text(name, "name is required")?;
        }
        if let Some(category) = &patch.category {
            validate_text(category, "category is required")?;
        }

        let item = self.store.update_item(id, patch).await?;
        info!(item_id = %id, "Menu item updated");
        Ok(item)
    }

    /// Deletes an item.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if it does not exist.
    pub async fn delete(&self, id: MenuItemId) -> Result<(), CatalogError> {
        if !self.store.delete_item(id).await? {
            return Err(CatalogError::ItemNotFound(id));
        }
        info!(item_id = %id, "Menu item deleted");
        Ok(())
    }

    /// Gets an item.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if it does not exist.
    pub async fn get(&self, id: MenuItemId) -> Result<MenuItem, CatalogError> {
        self.store
            .find_item(id)
            .await?
            .ok_or(CatalogError::ItemNotFound(id))
    }

    /// Gets an item that can be sold right now.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` or `ItemUnavailable`.
    pub async fn get_available(&self, id: MenuItemId) -> Result<MenuItem, CatalogError> {
        let item = self.get(id).await?;
        if !item.is_available {
            return Err(CatalogError::ItemUnavailable(id));
        }
        Ok(item)
    }

    /// Lists the menu.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` on store failure.
    pub async fn list(&self, available_only: bool) -> Result<Vec<MenuItem>, CatalogError> {
        self.store.list_items(available_only).await
    }
}

impl<C: CatalogStore> Clone for CatalogService<C> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

fn validate_price(price: Credits) -> Result<(), CatalogError> {
    if price.is_positive() {
        Ok(())
    } else {
        Err(CatalogError::InvalidPrice(price))
    }
}

fn validate_text(value: &str, reason: &'static str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        Err(CatalogError::InvalidItem(reason))
    } else {
        Ok(())
    }
}

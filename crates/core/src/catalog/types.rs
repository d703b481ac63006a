//! Menu catalog types.

use chrono::{DateTime, Utc};
use mealcard_shared::types::{Credits, MenuItemId};
use serde::{Deserialize, Serialize};

/// A priced menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Item ID.
    pub id: MenuItemId,
    /// Display name. Used in purchase descriptions.
    pub name: String,
    /// Price in credits. Always positive.
    pub price: Credits,
    /// Category, e.g. "breakfast".
    pub category: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional image reference.
    pub image: Option<String>,
    /// Only available items can be purchased.
    pub is_available: bool,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a menu item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewMenuItem {
    /// Display name.
    pub name: String,
    /// Price in credits.
    pub price: Credits,
    /// Category.
    pub category: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional image reference.
    #[serde(default)]
    pub image: Option<String>,
    /// Defaults to available.
    #[serde(default = "default_available")]
    pub is_available: bool,
}

const fn default_available() -> bool {
    true
}

impl NewMenuItem {
    /// Builds the stored item.
    #[must_use]
    pub fn into_item(self) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id: MenuItemId::new(),
            name: self.name.trim().to_string(),
            price: self.price,
            category: self.category.trim().to_string(),
            description: self.description,
            image: self.image,
            is_available: self.is_available,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a menu item. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MenuItemPatch {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New price.
    #[serde(default)]
    pub price: Option<Credits>,
    /// New category.
    #[serde(default)]
    pub category: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New image reference.
    #[serde(default)]
    pub image: Option<String>,
    /// New availability.
    #[serde(default)]
    pub is_available: Option<bool>,
}

impl MenuItemPatch {
    /// Applies the patch to `item` and bumps `updated_at`.
    pub fn apply(self, item: &mut MenuItem) {
        if let Some(name) = self.name {
            item.name = name.trim().to_string();
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(category) = self.category {
            item.category = category.trim().to_string();
        }
        if self.description.is_some() {
            item.description = self.description;
        }
        if self.image.is_some() {
            item.image = self.image;
        }
        if let Some(is_available) = self.is_available {
            item.is_available = is_available;
        }
        item.updated_at = Utc::now();
    }
}

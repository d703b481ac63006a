//! Menu item repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use mealcard_core::catalog::{CatalogError, CatalogStore, MenuItem, MenuItemPatch};
use mealcard_shared::types::{Credits, MenuItemId};

use super::to_utc;
use crate::entities::menu_items;

/// Menu item repository implementation.
#[derive(Debug, Clone)]
pub struct MenuRepository {
    db: DatabaseConnection,
}

impl MenuRepository {
    /// Creates a new menu item repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl CatalogStore for MenuRepository {
    async fn insert_item(&self, item: MenuItem) -> Result<MenuItem, CatalogError> {
        let model = to_active(&item)
            .insert(&self.db)
            .await
            .map_err(store_err)?;
        Ok(item_to_domain(model))
    }

    async fn find_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, CatalogError> {
        let model = menu_items::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(model.map(item_to_domain))
    }

    async fn update_item(
        &self,
        id: MenuItemId,
        patch: MenuItemPatch,
    ) -> Result<MenuItem, CatalogError> {
        let model = menu_items::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?
            .ok_or(CatalogError::ItemNotFound(id))?;

        let mut item = item_to_domain(model.clone());
        patch.apply(&mut item);

        let mut active: menu_items::ActiveModel = model.into();
        active.name = Set(item.name.clone());
        active.price = Set(item.price.units());
        active.category = Set(item.category.clone());
        active.description = Set(item.description.clone());
        active.image = Set(item.image.clone());
        active.is_available = Set(item.is_available);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await.map_err(store_err)?;
        Ok(item_to_domain(updated))
    }

    async fn delete_item(&self, id: MenuItemId) -> Result<bool, CatalogError> {
        let result = menu_items::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn list_items(&self, available_only: bool) -> Result<Vec<MenuItem>, CatalogError> {
        let mut select = menu_items::Entity::find();
        if available_only {
            select = select.filter(menu_items::Column::IsAvailable.eq(true));
        }

        let models = select
            .order_by_asc(menu_items::Column::Category)
            .order_by_asc(menu_items::Column::Name)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(models.into_iter().map(item_to_domain).collect())
    }
}

fn store_err(e: DbErr) -> CatalogError {
    CatalogError::StoreUnavailable(e.to_string())
}

fn to_active(item: &MenuItem) -> menu_items::ActiveModel {
    menu_items::ActiveModel {
        id: Set(item.id.into_inner()),
        name: Set(item.name.clone()),
        price: Set(item.price.units()),
        category: Set(item.category.clone()),
        description: Set(item.description.clone()),
        image: Set(item.image.clone()),
        is_available: Set(item.is_available),
        created_at: Set(item.created_at.into()),
        updated_at: Set(item.updated_at.into()),
    }
}

fn item_to_domain(model: menu_items::Model) -> MenuItem {
    MenuItem {
        id: MenuItemId::from_uuid(model.id),
        name: model.name,
        price: Credits::new(model.price),
        category: model.category,
        description: model.description,
        image: model.image,
        is_available: model.is_available,
        created_at: to_utc(model.created_at),
        updated_at: to_utc(model.updated_at),
    }
}

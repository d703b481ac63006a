//! Purchase service.

use mealcard_shared::types::{Credits, MenuItemId, UserId};
use serde::Serialize;
use tracing::info;

use super::error::PurchaseError;
use crate::catalog::{CatalogService, CatalogStore, MenuItem};
use crate::ledger::{LedgerError, LedgerService, LedgerStore, SettlementInput, TransactionRecord};

/// Result of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseReceipt {
    /// Card number debited.
    pub card_number: String,
    /// The purchase record.
    pub record: TransactionRecord,
    /// Balance after the debit.
    pub new_balance: Credits,
    /// The item sold.
    pub item: MenuItem,
}

/// Purchase service.
pub struct PurchaseService<L: LedgerStore, C: CatalogStore> {
    ledger: LedgerService<L>,
    catalog: CatalogService<C>,
}

impl<L: LedgerStore, C: CatalogStore> PurchaseService<L, C> {
    /// Creates a purchase service.
    #[must_use]
    pub fn new(ledger: LedgerService<L>, catalog: CatalogService<C>) -> Self {
        Self { ledger, catalog }
    }

    /// Sells one item against a card.
    ///
    /// # Errors
    ///
    /// - `Ledger(CardNotFound)` / `Ledger(CardInactive)` for the card
    /// - `Catalog(ItemNotFound)` / `Catalog(ItemUnavailable)` for the item
    /// - `Ledger(InsufficientFunds)` if the balance does not cover the price
    pub async fn purchase(
        &self,
        card_number: &str,
        item_id: MenuItemId,
        actor: UserId,
    ) -> Result<PurchaseReceipt, PurchaseError> {
        let card = self.ledger.card_by_number(card_number).await?;
        if !card.is_active {
            return Err(LedgerError::CardInactive(card.id).into());
        }

        let item = self.catalog.get_available(item_id).await?;

        let input = SettlementInput::purchase(
            card.id,
            item.price,
            format!("Purchase: {}", item.name),
            Some(actor),
        );
        let record = self.ledger.settle(input).await?;

        info!(
            card_number = %card.card_number,
            item_id = %item.id,
            cashier_id = %actor,
            balance = %record.balance_after,
            "Purchase completed"
        );

        Ok(PurchaseReceipt {
            card_number: card.card_number,
            new_balance: record.balance_after,
            record,
            item,
        })
    }
}

impl<L: LedgerStore, C: CatalogStore> Clone for PurchaseService<L, C> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            catalog: self.catalog.clone(),
        }
    }
}

//! Persistence seam for cards and the transaction log.

use std::future::Future;

use mealcard_shared::types::CardId;

use super::error::LedgerError;
use super::types::{
    Card, CardLookup, CardStatement, CardTotals, NewCard, SettlementInput, TransactionQuery,
    TransactionRecord,
};

/// Store trait for the ledger.
///
/// Implemented by the db crate for PostgreSQL and by
/// [`crate::memory::InMemoryStore`]. Implementations must apply
/// [`super::SettlementRule`] under exclusive access to the card and write the
/// balance and the record as one atomic unit.
pub trait LedgerStore: Send + Sync {
    /// Opens a card. A non-zero opening grant is written as a recharge record
    /// in the same atomic unit.
    fn open_card(
        &self,
        input: NewCard,
    ) -> impl Future<Output = Result<Card, LedgerError>> + Send;

    /// Finds a card.
    fn find_card(
        &self,
        lookup: &CardLookup,
    ) -> impl Future<Output = Result<Option<Card>, LedgerError>> + Send;

    /// Activates or deactivates a card. Balance and log are untouched.
    fn set_card_active(
        &self,
        card_id: CardId,
        is_active: bool,
    ) -> impl Future<Output = Result<Card, LedgerError>> + Send;

    /// Applies one settlement and returns the appended record.
    fn settle(
        &self,
        input: SettlementInput,
    ) -> impl Future<Output = Result<TransactionRecord, LedgerError>> + Send;

    /// Reads a card and its log as one consistent snapshot.
    fn statement(
        &self,
        card_id: CardId,
    ) -> impl Future<Output = Result<CardStatement, LedgerError>> + Send;

    /// Reads the log, newest first.
    fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> impl Future<Output = Result<Vec<TransactionRecord>, LedgerError>> + Send;

    /// Card count, active card count and sum of balances.
    fn card_totals(&self) -> impl Future<Output = Result<CardTotals, LedgerError>> + Send;
}

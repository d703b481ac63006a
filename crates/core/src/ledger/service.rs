//! Ledger service.
//!
//! Entry point for provisioning, card lookups and settlement. Every
//! successful mutation invalidates the analytics cache.

use std::sync::Arc;

use mealcard_shared::config::LedgerConfig;
use mealcard_shared::types::{CardId, Credits, UserId};
use tracing::{debug, error, info, warn};

use super::error::LedgerError;
use super::numbering::CardNumberGenerator;
use super::settlement::SettlementRule;
use super::store::LedgerStore;
use super::types::{
    Card, CardLookup, CardStatement, CardTotals, NewCard, SettlementInput, TransactionQuery,
    TransactionRecord,
};
use crate::analytics::AnalyticsCache;

/// Default number of records in the admin feed.
pub const DEFAULT_FEED_LIMIT: u64 = 100;

/// Fresh card numbers tried before a collision is reported.
const NUMBER_ATTEMPTS: usize = 3;

/// Per-student result of bulk provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOpenOutcome {
    /// The student a card was requested for.
    pub student_id: UserId,
    /// The opened card, or why this entry failed.
    pub result: Result<Card, LedgerError>,
}

/// Ledger service, generic over the backing store.
pub struct LedgerService<S: LedgerStore> {
    store: Arc<S>,
    numbers: CardNumberGenerator,
    opening_grant: Credits,
    cache: Option<AnalyticsCache>,
}

impl<S: LedgerStore> LedgerService<S> {
    /// Creates a ledger service.
    #[must_use]
    pub fn new(store: Arc<S>, numbers: CardNumberGenerator, opening_grant: Credits) -> Self {
        Self {
            store,
            numbers,
            opening_grant,
            cache: None,
        }
    }

    /// Creates a ledger service from configuration.
    #[must_use]
    pub fn from_config(store: Arc<S>, config: &LedgerConfig) -> Self {
        Self::new(
            store,
            CardNumberGenerator::new(config.card_number_prefix.clone()),
            Credits::new(config.opening_grant),
        )
    }

    /// Attaches the analytics cache to invalidate after mutations.
    #[must_use]
    pub fn with_cache(mut self, cache: AnalyticsCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Opens a card for a student with the configured opening grant.
    ///
    /// # Errors
    ///
    /// - `CardAlreadyExists` if the student already owns a card
    /// - `CardNumberTaken` if every generated number collided
    /// - `InvalidAmount` if the configured grant is negative
    /// - `StoreUnavailable` on store failure
    pub async fn open_card(
        &self,
        student_id: UserId,
        opened_by: Option<UserId>,
    ) -> Result<Card, LedgerError> {
        if self.opening_grant.is_negative() {
            return Err(LedgerError::InvalidAmount {
                amount: self.opening_grant,
                reason: "opening grant must not be negative",
            });
        }

        let mut attempt = 1;
        let result = loop {
            let input = NewCard {
                student_id,
                card_number: self.numbers.generate(),
                opening_grant: self.opening_grant,
                opened_by,
            };
            match self.store.open_card(input).await {
                Err(LedgerError::CardNumberTaken(number)) if attempt < NUMBER_ATTEMPTS => {
                    debug!(card_number = %number, attempt, "Card number collision, regenerating");
                    attempt += 1;
                }
                other => break other,
            }
        };

        match result {
            Ok(card) => {
                info!(
                    card_id = %card.id,
                    card_number = %card.card_number,
                    student_id = %student_id,
                    balance = %card.balance,
                    "Card opened"
                );
                self.invalidate();
                Ok(card)
            }
            Err(e) => Err(Self::report(e)),
        }
    }

    /// Opens cards for a batch of students, one at a time.
    ///
    /// Entries are independent: a failure is recorded against its student
    /// and the batch carries on. Outcomes are returned in input order, so a
    /// student listed twice gets a card for the first entry and
    /// `CardAlreadyExists` for the second.
    pub async fn open_cards(
        &self,
        students: &[UserId],
        opened_by: Option<UserId>,
    ) -> Vec<BulkOpenOutcome> {
        let mut outcomes = Vec::with_capacity(students.len());
        for &student_id in students {
            let result = self.open_card(student_id, opened_by).await;
            outcomes.push(BulkOpenOutcome { student_id, result });
        }

        let opened = outcomes.iter().filter(|o| o.result.is_ok()).count();
        info!(
            requested = students.len(),
            opened,
            failed = students.len() - opened,
            "Bulk card provisioning finished"
        );
        outcomes
    }

    /// Finds a card, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound` or `StoreUnavailable`.
    pub async fn find_card(&self, lookup: CardLookup) -> Result<Card, LedgerError> {
        self.store
            .find_card(&lookup)
            .await
            .map_err(Self::report)?
            .ok_or(LedgerError::CardNotFound(lookup))
    }

    /// Finds a card by its number.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound` or `StoreUnavailable`.
    pub async fn card_by_number(&self, card_number: &str) -> Result<Card, LedgerError> {
        self.find_card(CardLookup::Number(card_number.to_string()))
            .await
    }

    /// Finds the card owned by a student.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound` or `StoreUnavailable`.
    pub async fn card_for_student(&self, student_id: UserId) -> Result<Card, LedgerError> {
        self.find_card(CardLookup::Student(student_id)).await
    }

    /// Activates or deactivates a card.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound` or `StoreUnavailable`.
    pub async fn set_card_active(
        &self,
        card_id: CardId,
        is_active: bool,
    ) -> Result<Card, LedgerError> {
        let card = self
            .store
            .set_card_active(card_id, is_active)
            .await
            .map_err(Self::report)?;
        info!(card_id = %card_id, is_active, "Card status changed");
        Ok(card)
    }

    /// Applies a settlement. The only way a balance changes.
    ///
    /// Never retries; `StoreUnavailable` is returned to the caller.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound`, `CardInactive`, `InsufficientFunds`,
    /// `InvalidAmount` or `StoreUnavailable`.
    pub async fn settle(&self, input: SettlementInput) -> Result<TransactionRecord, LedgerError> {
        SettlementRule::validate_delta(input.kind, input.amount)?;

        match self.store.settle(input).await {
            Ok(record) => {
                info!(
                    card_id = %record.card_id,
                    kind = %record.kind,
                    amount = %record.amount,
                    balance = %record.balance_after,
                    "Settlement applied"
                );
                self.invalidate();
                Ok(record)
            }
            Err(e) => Err(Self::report(e)),
        }
    }

    /// Returns a card with its full log, newest first.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound` or `StoreUnavailable`.
    pub async fn statement(&self, card_id: CardId) -> Result<CardStatement, LedgerError> {
        self.store.statement(card_id).await.map_err(Self::report)
    }

    /// Returns the statement of the card a student owns.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound` or `StoreUnavailable`.
    pub async fn student_statement(&self, student_id: UserId) -> Result<CardStatement, LedgerError> {
        let card = self.card_for_student(student_id).await?;
        self.statement(card.id).await
    }

    /// Most recent records across all cards.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` on store failure.
    pub async fn recent_transactions(
        &self,
        limit: Option<u64>,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        let query = TransactionQuery {
            limit: Some(limit.unwrap_or(DEFAULT_FEED_LIMIT)),
            ..Default::default()
        };
        self.list_transactions(&query).await
    }

    /// Reads the log with a filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` on store failure.
    pub async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.store
            .list_transactions(query)
            .await
            .map_err(Self::report)
    }

    /// Ledger-wide card totals.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` on store failure.
    pub async fn card_totals(&self) -> Result<CardTotals, LedgerError> {
        self.store.card_totals().await.map_err(Self::report)
    }

    fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate();
        }
    }

    fn report(err: LedgerError) -> LedgerError {
        match &err {
            LedgerError::StoreUnavailable(msg) => error!(error = %msg, "Ledger store unavailable"),
            LedgerError::CardNotFound(_) | LedgerError::InvalidAmount { .. } => {}
            _ => warn!(error = %err, "Ledger operation rejected"),
        }
        err
    }
}

impl<S: LedgerStore> Clone for LedgerService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            numbers: self.numbers.clone(),
            opening_grant: self.opening_grant,
            cache: self.cache.clone(),
        }
    }
}

//! In-process store.
//!
//! Implements every store trait for single-node deployments and tests.
//! Each card sits behind its own async mutex; settlement holds it while the
//! balance, the card log and the global log are updated, so conflicting
//! settlements on one card serialize and settlements on different cards do
//! not block each other.
//!
//! Lock order: request lock, then card lock, then the global log. No
//! operation holds two card locks, and no `DashMap` guard is held across an
//! await. Every lock a mutation needs is acquired before the first write, so
//! a future dropped at any await leaves the store untouched.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use mealcard_shared::types::{CardId, Credits, MenuItemId, RechargeRequestId, UserId};
use tokio::sync::{Mutex, RwLock};

use crate::catalog::{CatalogError, CatalogStore, MenuItem, MenuItemPatch};
use crate::ledger::{
    Card, CardLookup, CardStatement, CardTotals, LedgerError, LedgerStore, NewCard,
    SettlementInput, SettlementRule, TransactionQuery, TransactionRecord,
};
use crate::recharge::{
    ApprovalOutcome, RechargeError, RechargeFilter, RechargeRequest, RechargeStore,
    RechargeWorkflow, RequestStatusCounts,
};


/// A card and its log, oldest record first.
#[derive(Debug)]
struct CardEntry {
    card: Card,
    records: Vec<TransactionRecord>,
}

/// In-process implementation of all store traits.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    cards: DashMap<CardId, Arc<Mutex<CardEntry>>>,
    card_numbers: DashMap<String, CardId>,
    student_cards: DashMap<UserId, CardId>,
    log: RwLock<Vec<Arc<TransactionRecord>>>,
    requests: DashMap<RechargeRequestId, Arc<Mutex<RechargeRequest>>>,
    menu: DashMap<MenuItemId, MenuItem>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn card_entry(&self, id: CardId) -> Option<Arc<Mutex<CardEntry>>> {
        self.cards.get(&id).map(|e| Arc::clone(e.value()))
    }

    fn resolve(&self, lookup: &CardLookup) -> Option<CardId> {
        match lookup {
            CardLookup::Id(id) => Some(*id),
            CardLookup::Number(number) => self.card_numbers.get(number).map(|e| *e.value()),
            CardLookup::Student(student) => self.student_cards.get(student).map(|e| *e.value()),
        }
    }

    fn request_entry(&self, id: RechargeRequestId) -> Option<Arc<Mutex<RechargeRequest>>> {
        self.requests.get(&id).map(|e| Arc::clone(e.value()))
    }

    /// Claims the student and card number for a new card, or reports a conflict.
    fn reserve(&self, input: &NewCard, card_id: CardId) -> Result<(), LedgerError> {
        match self.student_cards.entry(input.student_id) {
            Entry::Occupied(_) => return Err(LedgerError::CardAlreadyExists(input.student_id)),
            Entry::Vacant(v) => {
                v.insert(card_id);
            }
        }

        let number_taken = match self.card_numbers.entry(input.card_number.clone()) {
            Entry::Occupied(_) => true,
            Entry::Vacant(v) => {
                v.insert(card_id);
                false
            }
        };
        if number_taken {
            self.student_cards.remove(&input.student_id);
            return Err(LedgerError::CardNumberTaken(input.card_number.clone()));
        }
        Ok(())
    }
}

impl LedgerStore for InMemoryStore {
    async fn open_card(&self, input: NewCard) -> Result<Card, LedgerError> {
        let mut log = self.log.write().await;

        let now = Utc::now();
        let mut entry = CardEntry {
            card: Card {
                id: CardId::new(),
                card_number: input.card_number.clone(),
                student_id: input.student_id,
                balance: Credits::ZERO,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
            records: Vec::new(),
        };

        let grant = input.opening_grant.is_positive().then(|| {
            SettlementInput::recharge(
                entry.card.id,
                input.opening_grant,
                "Opening balance",
                input.opened_by,
            )
        });
        let grant_record = match &grant {
            Some(grant) => {
                let balance = SettlementRule::apply(&entry.card, grant)?;
                entry.card.balance = balance;
                Some(SettlementRule::record(grant, balance, now))
            }
            None => None,
        };

        self.reserve(&input, entry.card.id)?;
        if let Some(record) = grant_record {
            entry.records.push(record.clone());
            log.push(Arc::new(record));
        }

        let card = entry.card.clone();
        self.cards.insert(card.id, Arc::new(Mutex::new(entry)));
        Ok(card)
    }

    async fn find_card(&self, lookup: &CardLookup) -> Result<Option<Card>, LedgerError> {
        let Some(entry) = self.resolve(lookup).and_then(|id| self.card_entry(id)) else {
            return Ok(None);
        };
        let card = entry.lock().await.card.clone();
        Ok(Some(card))
    }

    async fn set_card_active(&self, card_id: CardId, is_active: bool) -> Result<Card, LedgerError> {
        let entry = self
            .card_entry(card_id)
            .ok_or(LedgerError::CardNotFound(CardLookup::Id(card_id)))?;
        let mut guard = entry.lock().await;
        guard.card.is_active = is_active;
        guard.card.updated_at = Utc::now();
        Ok(guard.card.clone())
    }

    async fn settle(&self, input: SettlementInput) -> Result<TransactionRecord, LedgerError> {
        let entry = self
            .card_entry(input.card_id)
            .ok_or(LedgerError::CardNotFound(CardLookup::Id(input.card_id)))?;
        let mut guard = entry.lock().await;
        let mut log = self.log.write().await;

        let balance = SettlementRule::apply(&guard.card, &input)?;
        let now = Utc::now();
        let record = SettlementRule::record(&input, balance, now);

        guard.card.balance = balance;
        guard.card.updated_at = now;
        guard.records.push(record.clone());
        log.push(Arc::new(record.clone()));

        Ok(record)
    }

    async fn statement(&self, card_id: CardId) -> Result<CardStatement, LedgerError> {
        let entry = self
            .card_entry(card_id)
            .ok_or(LedgerError::CardNotFound(CardLookup::Id(card_id)))?;
        let guard = entry.lock().await;
        Ok(CardStatement {
            card: guard.card.clone(),
            records: guard.records.iter().rev().cloned().collect(),
        })
    }

    async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        // Copy out the shared pointers and filter without the lock.
        let snapshot: Vec<Arc<TransactionRecord>> = self.log.read().await.clone();
        let limit = query
            .limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);
        Ok(snapshot
            .iter()
            .rev()
            .filter(|r| query.matches(r))
            .take(limit)
            .map(|r| (**r).clone())
            .collect())
    }

    async fn card_totals(&self) -> Result<CardTotals, LedgerError> {
        let entries: Vec<_> = self.cards.iter().map(|e| Arc::clone(e.value())).collect();
        let mut totals = CardTotals::default();
        let mut outstanding = 0_i64;
        for entry in entries {
            let guard = entry.lock().await;
            totals.cards += 1;
            if guard.card.is_active {
                totals.active_cards += 1;
            }
            outstanding = outstanding.saturating_add(guard.card.balance.units());
        }
        totals.outstanding_balance = outstanding.into();
        Ok(totals)
    }
}

impl RechargeStore for InMemoryStore {
    async fn insert_request(
        &self,
        request: RechargeRequest,
    ) -> Result<RechargeRequest, RechargeError> {
        self.requests
            .insert(request.id, Arc::new(Mutex::new(request.clone())));
        Ok(request)
    }

    async fn find_request(
        &self,
        id: RechargeRequestId,
    ) -> Result<Option<RechargeRequest>, RechargeError> {
        match self.request_entry(id) {
            Some(entry) => Ok(Some(entry.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn approve(
        &self,
        id: RechargeRequestId,
        actor: UserId,
    ) -> Result<ApprovalOutcome, RechargeError> {
        let entry = self
            .request_entry(id)
            .ok_or(RechargeError::RequestNotFound(id))?;
        let mut request = entry.lock().await;

        let transition = RechargeWorkflow::approve(&request, actor)?;
        // Still holding the request lock: a failed settlement leaves it pending.
        // Settlement takes all its locks before its first write and nothing
        // below awaits, so a dropped approval settles and transitions, or
        // does neither.
        let record =
            LedgerStore::settle(self, RechargeWorkflow::settlement_for(&request, actor)).await?;
        transition.apply(&mut request, Some(record.id));

        Ok(ApprovalOutcome {
            request: request.clone(),
            record,
        })
    }

    async fn reject(
        &self,
        id: RechargeRequestId,
        actor: UserId,
    ) -> Result<RechargeRequest, RechargeError> {
        let entry = self
            .request_entry(id)
            .ok_or(RechargeError::RequestNotFound(id))?;
        let mut request = entry.lock().await;

        RechargeWorkflow::reject(&request, actor)?.apply(&mut request, None);
        Ok(request.clone())
    }

    async fn list_requests(
        &self,
        filter: &RechargeFilter,
    ) -> Result<Vec<RechargeRequest>, RechargeError> {
        let entries: Vec<_> = self
            .requests
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect();

        let mut requests = Vec::new();
        for entry in entries {
            let request = entry.lock().await;
            if filter.matches(&request) {
                requests.push(request.clone());
            }
        }

        requests.sort_by(|a, b| {
            b.requested_at
                .cmp(&a.requested_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        if let Some(limit) = filter.limit.and_then(|l| usize::try_from(l).ok()) {
            requests.truncate(limit);
        }
        Ok(requests)
    }

    async fn status_counts(&self) -> Result<RequestStatusCounts, RechargeError> {
        let entries: Vec<_> = self
            .requests
            .iter()
            .map(|e| Arc::clone(e.value()))
            .collect();

        let mut counts = RequestStatusCounts::default();
        for entry in entries {
            counts.add(entry.lock().await.status);
        }
        Ok(counts)
    }
}

impl CatalogStore for InMemoryStore {
    async fn insert_item(&self, item: MenuItem) -> Result<MenuItem, CatalogError> {
        self.menu.insert(item.id, item.clone());
        Ok(item)
    }

    async fn find_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, CatalogError> {
        Ok(self.menu.get(&id).map(|e| e.value().clone()))
    }

    async fn update_item(
        &self,
        id: MenuItemId,
        patch: MenuItemPatch,
    ) -> Result<MenuItem, CatalogError> {
        let mut item = self
            .menu
            .get_mut(&id)
            .ok_or(CatalogError::ItemNotFound(id))?;
        patch.apply(&mut item);
        Ok(item.clone())
    }

    async fn delete_item(&self, id: MenuItemId) -> Result<bool, CatalogError> {
        Ok(self.menu.remove(&id).is_some())
    }

    async fn list_items(&self, available_only: bool) -> Result<Vec<MenuItem>, CatalogError> {
        let mut items: Vec<MenuItem> = self
            .menu
            .iter()
            .filter(|e| !available_only || e.value().is_available)
            .map(|e| e.value().clone())
            .collect();
        items.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        Ok(items)
    }
}

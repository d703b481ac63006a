//! Recharge workflow service.

use std::sync::Arc;

use mealcard_shared::types::{RechargeRequestId, UserId};
use tracing::{error, info, warn};

use super::error::RechargeError;
use super::store::RechargeStore;
use super::types::{
    ApprovalOutcome, NewRechargeRequest, RechargeFilter, RechargeRequest, RechargeStatus,
};
use crate::analytics::AnalyticsCache;
use crate::ledger::{CardLookup, LedgerError, LedgerStore};

/// Recharge workflow service.
///
/// Card checks on submit go through the ledger store; decisions go through
/// the recharge store, which owns the atomic approve-and-settle unit.
pub struct RechargeService<L: LedgerStore, R: RechargeStore> {
    ledger: Arc<L>,
    requests: Arc<R>,
    cache: Option<AnalyticsCache>,
}

impl<L: LedgerStore, R: RechargeStore> RechargeService<L, R> {
    /// Creates a recharge service.
    #[must_use]
    pub fn new(ledger: Arc<L>, requests: Arc<R>) -> Self {
        Self {
            ledger,
            requests,
            cache: None,
        }
    }

    /// Attaches the analytics cache to invalidate after transitions.
    #[must_use]
    pub fn with_cache(mut self, cache: AnalyticsCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Submits a pending request. The ledger is not touched.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if the amount is not positive
    /// - `Ledger(CardNotFound)` if the student has no card
    /// - `Ledger(CardInactive)` if the card is deactivated
    pub async fn submit(
        &self,
        student_id: UserId,
        input: NewRechargeRequest,
    ) -> Result<RechargeRequest, RechargeError> {
        if !input.amount.is_positive() {
            return Err(RechargeError::InvalidAmount(input.amount));
        }

        let lookup = CardLookup::Student(student_id);
        let card = self
            .ledger
            .find_card(&lookup)
            .await?
            .ok_or(LedgerError::CardNotFound(lookup))?;
        if !card.is_active {
            return Err(LedgerError::CardInactive(card.id).into());
        }

        let request = RechargeRequest::pending(student_id, card.id, input.amount, input.payment);
        let request = self
            .requests
            .insert_request(request)
            .await
            .map_err(Self::report)?;

        info!(
            request_id = %request.id,
            student_id = %student_id,
            amount = %request.amount,
            method = %request.payment.method,
            "Recharge request submitted"
        );
        self.invalidate();
        Ok(request)
    }

    /// Approves a pending request and credits the card.
    ///
    /// # Errors
    ///
    /// - `RequestNotFound` / `RequestNotPending`
    /// - `Ledger(..)` if settlement fails; the request stays pending
    pub async fn approve(
        &self,
        id: RechargeRequestId,
        actor: UserId,
    ) -> Result<ApprovalOutcome, RechargeError> {
        let outcome = self
            .requests
            .approve(id, actor)
            .await
            .map_err(Self::report)?;

        info!(
            request_id = %id,
            manager_id = %actor,
            card_id = %outcome.record.card_id,
            amount = %outcome.record.amount,
            balance = %outcome.record.balance_after,
            "Recharge request approved"
        );
        self.invalidate();
        Ok(outcome)
    }

    /// Rejects a pending request.
    ///
    /// # Errors
    ///
    /// Returns `RequestNotFound` or `RequestNotPending`.
    pub async fn reject(
        &self,
        id: RechargeRequestId,
        actor: UserId,
    ) -> Result<RechargeRequest, RechargeError> {
        let request = self
            .requests
            .reject(id, actor)
            .await
            .map_err(Self::report)?;

        info!(request_id = %id, manager_id = %actor, "Recharge request rejected");
        self.invalidate();
        Ok(request)
    }

    /// Gets a request by ID.
    ///
    /// # Errors
    ///
    /// Returns `RequestNotFound` or `StoreUnavailable`.
    pub async fn get(&self, id: RechargeRequestId) -> Result<RechargeRequest, RechargeError> {
        self.requests
            .find_request(id)
            .await
            .map_err(Self::report)?
            .ok_or(RechargeError::RequestNotFound(id))
    }

    /// A student's own requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` on store failure.
    pub async fn list_for_student(
        &self,
        student_id: UserId,
    ) -> Result<Vec<RechargeRequest>, RechargeError> {
        self.list(&RechargeFilter {
            student_id: Some(student_id),
            ..Default::default()
        })
        .await
    }

    /// All requests, optionally by status, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` on store failure.
    pub async fn list_by_status(
        &self,
        status: Option<RechargeStatus>,
    ) -> Result<Vec<RechargeRequest>, RechargeError> {
        self.list(&RechargeFilter {
            status,
            ..Default::default()
        })
        .await
    }

    /// Lists requests with a filter.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` on store failure.
    pub async fn list(
        &self,
        filter: &RechargeFilter,
    ) -> Result<Vec<RechargeRequest>, RechargeError> {
        self.requests
            .list_requests(filter)
            .await
            .map_err(Self::report)
    }

    fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate();
        }
    }

    fn report(err: RechargeError) -> RechargeError {
        match &err {
            RechargeError::StoreUnavailable(msg)
            | RechargeError::Ledger(LedgerError::StoreUnavailable(msg)) => {
                error!(error = %msg, "Recharge store unavailable");
            }
            RechargeError::RequestNotFound(_) | RechargeError::InvalidAmount(_) => {}
            _ => warn!(error = %err, "Recharge operation rejected"),
        }
        err
    }
}

impl<L: LedgerStore, R: RechargeStore> Clone for RechargeService<L, R> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            requests: Arc::clone(&self.requests),
            cache: self.cache.clone(),
        }
    }
}


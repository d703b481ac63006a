//! Analytics service.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use tracing::debug;

use super::aggregator::Aggregator;
use super::cache::AnalyticsCache;
use super::error::AnalyticsError;
use super::types::{AnalyticsSnapshot, DashboardSummary};
use super::window::TimeWindow;
use crate::ledger::{LedgerStore, TransactionQuery};
use crate::recharge::RechargeStore;

/// Analytics service. Reads only; never writes to either store.
pub struct AnalyticsService<L: LedgerStore, R: RechargeStore> {
    ledger: Arc<L>,
    requests: Arc<R>,
    cache: AnalyticsCache,
    timezone: Tz,
}

impl<L: LedgerStore, R: RechargeStore> AnalyticsService<L, R> {
    /// Creates an analytics service. `cache` must be the same instance the
    /// mutating services invalidate.
    #[must_use]
    pub fn new(ledger: Arc<L>, requests: Arc<R>, cache: AnalyticsCache, timezone: Tz) -> Self {
        Self {
            ledger,
            requests,
            cache,
            timezone,
        }
    }

    /// The current local day in the configured timezone.
    #[must_use]
    pub fn today_window(&self) -> TimeWindow {
        TimeWindow::today(self.timezone, Utc::now())
    }

    /// Snapshot for today.
    ///
    /// # Errors
    ///
    /// Returns an error if either store is unavailable.
    pub async fn today(&self) -> Result<Arc<AnalyticsSnapshot>, AnalyticsError> {
        self.snapshot(self.today_window()).await
    }

    /// Snapshot for `window`, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if either store is unavailable.
    pub async fn snapshot(
        &self,
        window: TimeWindow,
    ) -> Result<Arc<AnalyticsSnapshot>, AnalyticsError> {
        if let Some(cached) = self.cache.get(&window) {
            debug!(start = %window.start, end = %window.end, "Analytics cache hit");
            return Ok(cached);
        }

        let generation = self.cache.generation();
        let snapshot = self.compute(window).await?;
        Ok(self.cache.insert(generation, snapshot))
    }

    /// Recomputes a snapshot from history, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if either store is unavailable.
    pub async fn compute(&self, window: TimeWindow) -> Result<AnalyticsSnapshot, AnalyticsError> {
        let query = TransactionQuery {
            from: Some(window.start),
            to: Some(window.end),
            ..Default::default()
        };
        let records = self.ledger.list_transactions(&query).await?;
        let counts = self.requests.status_counts().await?;
        Ok(Aggregator::snapshot(window, &records, counts))
    }

    /// Admin dashboard summary.
    ///
    /// # Errors
    ///
    /// Returns an error if either store is unavailable.
    pub async fn dashboard(&self) -> Result<DashboardSummary, AnalyticsError> {
        let totals = self.ledger.card_totals().await?;
        let today = self.today().await?;

        Ok(DashboardSummary {
            total_cards: totals.cards,
            active_cards: totals.active_cards,
            total_balance: totals.outstanding_balance,
            today_transactions: today.transaction_count(),
            pending_requests: today.requests.pending,
        })
    }
}

impl<L: LedgerStore, R: RechargeStore> Clone for AnalyticsService<L, R> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            requests: Arc::clone(&self.requests),
            cache: self.cache.clone(),
            timezone: self.timezone,
        }
    }
}

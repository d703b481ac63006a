//! Pure rollup over the transaction log.

use mealcard_shared::types::Credits;

use super::types::AnalyticsSnapshot;
use super::window::TimeWindow;
use crate::ledger::{TransactionKind, TransactionRecord};
use crate::recharge::RequestStatusCounts;

/// Stateless aggregator.
pub struct Aggregator;

impl Aggregator {
    /// Rolls up the records that fall inside `window`. Records outside it
    /// are ignored, so callers may pass a superset.
    #[must_use]
    pub fn snapshot(
        window: TimeWindow,
        records: &[TransactionRecord],
        requests: RequestStatusCounts,
    ) -> AnalyticsSnapshot {
        let mut snapshot = AnalyticsSnapshot {
            window,
            recharge_count: 0,
            purchase_count: 0,
            total_revenue: Credits::ZERO,
            total_spend: Credits::ZERO,
            requests,
        };

        let mut revenue = 0_i64;
        let mut spend = 0_i64;
        for record in records.iter().filter(|r| window.contains(r.created_at)) {
            match record.kind {
                TransactionKind::Recharge => snapshot.recharge_count += 1,
                TransactionKind::Purchase => {
                    snapshot.purchase_count += 1;
                    spend = spend.saturating_add(record.amount.saturating_abs().units());
                }
            }
            if record.amount.is_positive() {
                revenue = revenue.saturating_add(record.amount.units());
            }
        }

        snapshot.total_revenue = Credits::new(revenue);
        snapshot.total_spend = Credits::new(spend);
        snapshot
    }
}

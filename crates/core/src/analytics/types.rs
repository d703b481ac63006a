//! Analytics types.

use mealcard_shared::types::Credits;
use serde::Serialize;

use super::window::TimeWindow;
use crate::recharge::RequestStatusCounts;

/// Rollup of one time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsSnapshot {
    /// The window covered.
    pub window: TimeWindow,
    /// Recharge records in the window.
    pub recharge_count: u64,
    /// Purchase records in the window.
    pub purchase_count: u64,
    /// Sum of positive record amounts in the window.
    pub total_revenue: Credits,
    /// Absolute sum of purchase amounts in the window.
    pub total_spend: Credits,
    /// Request counts by status (all time).
    pub requests: RequestStatusCounts,
}

impl AnalyticsSnapshot {
    /// Total records in the window.
    #[must_use]
    pub const fn transaction_count(&self) -> u64 {
        self.recharge_count + self.purchase_count
    }
}

/// Admin dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    /// Cards ever opened.
    pub total_cards: u64,
    /// Active cards.
    pub active_cards: u64,
    /// Sum of all card balances.
    pub total_balance: Credits,
    /// Records written today.
    pub today_transactions: u64,
    /// Requests awaiting a decision.
    pub pending_requests: u64,
}

//! Read-side analytics.
//!
//! Rollups are derived from the transaction log and the recharge workflow
//! on demand. Cached snapshots are dropped on every mutation made through
//! the services; nothing is ever incremented in place.
//!
//! # Modules
//!
//! - `window` - Half-open time windows and the local "today" window
//! - `types` - Snapshot and dashboard types
//! - `aggregator` - Pure rollup over records
//! - `cache` - Moka-backed snapshot cache with generation-based invalidation
//! - `service` - Cached snapshots and the admin dashboard

pub mod aggregator;
pub mod cache;
pub mod error;
pub mod service;
pub mod types;
pub mod window;

pub use aggregator::Aggregator;
pub use cache::AnalyticsCache;
pub use error::AnalyticsError;
pub use service::AnalyticsService;
pub use types::{AnalyticsSnapshot, DashboardSummary};
pub use window::TimeWindow;

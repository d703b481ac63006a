//! PostgreSQL implementations of the core store traits.
//!
//! Each repository wraps a `DatabaseConnection` and maps `DbErr` to the
//! calling domain's `StoreUnavailable`, except unique violations on card
//! creation, which are conflicts.

pub mod card;
pub mod menu;
pub mod recharge;

pub use card::CardRepository;
pub use menu::MenuRepository;
pub use recharge::RechargeRepository;

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;

/// Converts a stored timestamp to UTC.
pub(crate) fn to_utc(at: DateTimeWithTimeZone) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

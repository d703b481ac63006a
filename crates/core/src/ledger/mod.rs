//! Balance ledger and settlement engine.
//!
//! This module implements the core ledger functionality:
//! - Card and transaction record domain types
//! - Error types for ledger operations
//! - Settlement rules (the only way a balance may change)
//! - The store trait persistence backends implement
//! - Ledger service for provisioning, lookups and settlement
//! - Card number generation

pub mod error;
pub mod numbering;
pub mod service;
pub mod settlement;
pub mod store;
pub mod types;

#[cfg(test)]
mod settlement_props;

pub use error::LedgerError;
pub use numbering::CardNumberGenerator;
pub use service::{BulkOpenOutcome, DEFAULT_FEED_LIMIT, LedgerService};
pub use settlement::SettlementRule;
pub use store::LedgerStore;
pub use types::{
    Card, CardLookup, CardStatement, CardTotals, NewCard, SettlementInput, TransactionKind,
    TransactionQuery, TransactionRecord,
};

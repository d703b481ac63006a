//! Core business logic for the meal card ledger.
//!
//! This crate contains the settlement rules, the recharge workflow state
//! machine and the read-side analytics, with ZERO web or database
//! dependencies. Persistence is reached through the store traits defined
//! next to each domain; the `db` crate implements them for PostgreSQL and
//! [`memory::InMemoryStore`] implements them in-process.
//!
//! # Modules
//!
//! - `ledger` - Cards, the transaction log and the settlement engine
//! - `recharge` - Recharge request lifecycle (`pending → approved | rejected`)
//! - `catalog` - Priced menu items sold at the counter
//! - `purchase` - Cashier purchase path
//! - `analytics` - Rollups derived from the log and workflow state
//! - `memory` - Single-node store with per-card locking

pub mod analytics;
pub mod catalog;
pub mod ledger;
pub mod memory;
pub mod purchase;
pub mod recharge;

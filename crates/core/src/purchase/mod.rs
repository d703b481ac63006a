//! Cashier purchase path.
//!
//! Looks up the card by number and the item by ID, then debits the item
//! price through the settlement engine.

pub mod error;
pub mod service;

pub use error::PurchaseError;
pub use service::{PurchaseReceipt, PurchaseService};

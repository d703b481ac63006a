//! Recharge request workflow.
//!
//! Students submit requests; managers approve or reject them. A request
//! settles against the ledger at most once, on `pending → approved`.
//!
//! # Modules
//!
//! - `types` - Request, status and payment types
//! - `error` - Workflow error types
//! - `workflow` - Pure state transition rules
//! - `store` - Persistence seam
//! - `service` - Submit, approve, reject and listings

pub mod error;
pub mod service;
pub mod store;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod workflow_props;

pub use error::RechargeError;
pub use service::RechargeService;
pub use store::RechargeStore;
pub use types::{
    ApprovalOutcome, NewRechargeRequest, PaymentInfo, PaymentMethod, RechargeFilter,
    RechargeRequest, RechargeStatus, RequestStatusCounts,
};
pub use workflow::{RechargeWorkflow, Transition};

//! Persistence seam for recharge requests.

use std::future::Future;

use mealcard_shared::types::{RechargeRequestId, UserId};

use super::error::RechargeError;
use super::types::{ApprovalOutcome, RechargeFilter, RechargeRequest, RequestStatusCounts};

/// Store trait for recharge requests.
///
/// `approve` must run [`super::RechargeWorkflow::approve`] and the resulting
/// settlement as one atomic unit: if settlement fails the request stays
/// pending, and two concurrent decisions on one request never both succeed.
pub trait RechargeStore: Send + Sync {
    /// Persists a new pending request.
    fn insert_request(
        &self,
        request: RechargeRequest,
    ) -> impl Future<Output = Result<RechargeRequest, RechargeError>> + Send;

    /// Finds a request by ID.
    fn find_request(
        &self,
        id: RechargeRequestId,
    ) -> impl Future<Output = Result<Option<RechargeRequest>, RechargeError>> + Send;

    /// Approves a pending request and settles it.
    fn approve(
        &self,
        id: RechargeRequestId,
        actor: UserId,
    ) -> impl Future<Output = Result<ApprovalOutcome, RechargeError>> + Send;

    /// Rejects a pending request.
    fn reject(
        &self,
        id: RechargeRequestId,
        actor: UserId,
    ) -> impl Future<Output = Result<RechargeRequest, RechargeError>> + Send;

    /// Lists requests, newest first.
    fn list_requests(
        &self,
        filter: &RechargeFilter,
    ) -> impl Future<Output = Result<Vec<RechargeRequest>, RechargeError>> + Send;

    /// Counts all requests by status.
    fn status_counts(
        &self,
    ) -> impl Future<Output = Result<RequestStatusCounts, RechargeError>> + Send;
}

//! Recharge workflow domain types.

use chrono::{DateTime, Utc};
use mealcard_shared::types::{CardId, Credits, RechargeRequestId, TransactionRecordId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ledger::TransactionRecord;

/// Recharge request status.
///
/// Valid transitions:
/// - Pending → Approved (approve, settles once)
/// - Pending → Rejected (reject)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RechargeStatus {
    /// Awaiting a manager decision.
    Pending,
    /// Approved and settled.
    Approved,
    /// Rejected without settlement.
    Rejected,
}

impl RechargeStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if no further transition is allowed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for RechargeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the student says they paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Online gateway payment.
    Online,
    /// Cash at the counter.
    Cash,
    /// UPI transfer.
    #[default]
    Upi,
}

impl PaymentMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Cash => "cash",
            Self::Upi => "upi",
        }
    }

    /// Parses a method from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "online" => Some(Self::Online),
            "cash" => Some(Self::Cash),
            "upi" => Some(Self::Upi),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment details attached to a request. References are opaque and kept for audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    /// Payment method.
    #[serde(default)]
    pub method: PaymentMethod,
    /// Gateway transaction ID.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// UPI reference number.
    #[serde(default)]
    pub upi_reference: Option<String>,
    /// Reference to a proof-of-payment artifact.
    #[serde(default)]
    pub proof_reference: Option<String>,
}

/// A student's request to add credits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RechargeRequest {
    /// Request ID.
    pub id: RechargeRequestId,
    /// Requesting student.
    pub student_id: UserId,
    /// Card to credit.
    pub card_id: CardId,
    /// Requested amount. Always positive.
    pub amount: Credits,
    /// Payment details.
    pub payment: PaymentInfo,
    /// Current status.
    pub status: RechargeStatus,
    /// When the request was submitted.
    pub requested_at: DateTime<Utc>,
    /// Manager who decided the request.
    pub processed_by: Option<UserId>,
    /// When the request was decided.
    pub processed_at: Option<DateTime<Utc>>,
    /// Record written by the approval settlement.
    pub record_id: Option<TransactionRecordId>,
}

impl RechargeRequest {
    /// Creates a pending request.
    #[must_use]
    pub fn pending(
        student_id: UserId,
        card_id: CardId,
        amount: Credits,
        payment: PaymentInfo,
    ) -> Self {
        Self {
            id: RechargeRequestId::new(),
            student_id,
            card_id,
            amount,
            payment,
            status: RechargeStatus::Pending,
            requested_at: Utc::now(),
            processed_by: None,
            processed_at: None,
            record_id: None,
        }
    }
}

/// Input for submitting a request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewRechargeRequest {
    /// Requested amount.
    pub amount: Credits,
    /// Payment details.
    #[serde(flatten)]
    pub payment: PaymentInfo,
}

/// Result of a successful approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalOutcome {
    /// The request, now approved.
    pub request: RechargeRequest,
    /// The recharge record written to the log.
    pub record: TransactionRecord,
}

/// Filter for listing requests. Results are newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RechargeFilter {
    /// Only requests from this student.
    pub student_id: Option<UserId>,
    /// Only requests in this status.
    pub status: Option<RechargeStatus>,
    /// Maximum number of requests.
    pub limit: Option<u64>,
}

impl RechargeFilter {
    /// Returns true if `request` passes every filter (ignores `limit`).
    #[must_use]
    pub fn matches(&self, request: &RechargeRequest) -> bool {
        self.student_id.is_none_or(|id| request.student_id == id)
            && self.status.is_none_or(|status| request.status == status)
    }
}

/// Number of requests in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatusCounts {
    /// Pending requests.
    pub pending: u64,
    /// Approved requests.
    pub approved: u64,
    /// Rejected requests.
    pub rejected: u64,
}

impl RequestStatusCounts {
    /// Counts one request in `status`.
    pub fn add(&mut self, status: RechargeStatus) {
        match status {
            RechargeStatus::Pending => self.pending += 1,
            RechargeStatus::Approved => self.approved += 1,
            RechargeStatus::Rejected => self.rejected += 1,
        }
    }
}

impl FromIterator<RechargeStatus> for RequestStatusCounts {
    fn from_iter<I: IntoIterator<Item = RechargeStatus>>(iter: I) -> Self {
        let mut counts = Self::default();
        for status in iter {
            counts.add(status);
        }
        counts
    }
}

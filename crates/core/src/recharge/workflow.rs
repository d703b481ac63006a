//! Recharge request state machine.
//!
//! Pure transition rules. Stores evaluate them while holding exclusive
//! access to the request so that exactly one decision wins.

use chrono::{DateTime, Utc};
use mealcard_shared::types::{TransactionRecordId, UserId};

use crate::ledger::SettlementInput;
use crate::recharge::error::RechargeError;
use crate::recharge::types::{PaymentMethod, RechargeRequest, RechargeStatus};

/// A validated decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Status after the decision.
    pub new_status: RechargeStatus,
    /// Deciding actor.
    pub processed_by: UserId,
    /// Decision time.
    pub processed_at: DateTime<Utc>,
}

impl Transition {
    /// Writes the decision onto `request`.
    pub fn apply(self, request: &mut RechargeRequest, record_id: Option<TransactionRecordId>) {
        request.status = self.new_status;
        request.processed_by = Some(self.processed_by);
        request.processed_at = Some(self.processed_at);
        request.record_id = record_id;
    }
}

/// Stateless recharge workflow rules.
pub struct RechargeWorkflow;

impl RechargeWorkflow {
    /// Validates `pending → approved`.
    ///
    /// # Errors
    ///
    /// Returns `RechargeError::RequestNotPending` if already decided.
    pub fn approve(request: &RechargeRequest, actor: UserId) -> Result<Transition, RechargeError> {
        Self::decide(request, RechargeStatus::Approved, actor)
    }

    /// Validates `pending → rejected`.
    ///
    /// # Errors
    ///
    /// Returns `RechargeError::RequestNotPending` if already decided.
    pub fn reject(request: &RechargeRequest, actor: UserId) -> Result<Transition, RechargeError> {
        Self::decide(request, RechargeStatus::Rejected, actor)
    }

    /// The settlement an approval performs.
    #[must_use]
    pub fn settlement_for(request: &RechargeRequest, actor: UserId) -> SettlementInput {
        SettlementInput::recharge(
            request.card_id,
            request.amount,
            Self::description(request.payment.method),
            Some(actor),
        )
    }

    /// Log description for an approved recharge.
    #[must_use]
    pub fn description(method: PaymentMethod) -> String {
        format!("Recharge approved - {method} payment")
    }

    fn decide(
        request: &RechargeRequest,
        new_status: RechargeStatus,
        actor: UserId,
    ) -> Result<Transition, RechargeError> {
        match request.status {
            RechargeStatus::Pending => Ok(Transition {
                new_status,
                processed_by: actor,
                processed_at: Utc::now(),
            }),
            status => Err(RechargeError::RequestNotPending {
                id: request.id,
                status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionKind;
    use crate::recharge::types::PaymentInfo;
    use mealcard_shared::types::{CardId, Credits};

    fn pending(method: PaymentMethod) -> RechargeRequest {
        RechargeRequest::pending(
            UserId::new(),
            CardId::new(),
            Credits::new(50),
            PaymentInfo {
                method,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_approve_pending() {
        let mut request = pending(PaymentMethod::Upi);
        let manager = UserId::new();
        let transition = RechargeWorkflow::approve(&request, manager).unwrap();
        assert_eq!(transition.new_status, RechargeStatus::Approved);

        let record_id = TransactionRecordId::new();
        transition.apply(&mut request, Some(record_id));
        assert_eq!(request.status, RechargeStatus::Approved);
        assert_eq!(request.processed_by, Some(manager));
        assert!(request.processed_at.is_some());
        assert_eq!(request.record_id, Some(record_id));
    }

    #[test]
    fn test_reject_pending() {
        let request = pending(PaymentMethod::Cash);
        let transition = RechargeWorkflow::reject(&request, UserId::new()).unwrap();
        assert_eq!(transition.new_status, RechargeStatus::Rejected);
    }

    #[test]
    fn test_decided_request_is_final() {
        let mut request = pending(PaymentMethod::Upi);
        RechargeWorkflow::reject(&request, UserId::new())
            .unwrap()
            .apply(&mut request, None);

        assert_eq!(
            RechargeWorkflow::approve(&request, UserId::new()),
            Err(RechargeError::RequestNotPending {
                id: request.id,
                status: RechargeStatus::Rejected,
            })
        );
    }

    #[test]
    fn test_settlement_for_approval() {
        let request = pending(PaymentMethod::Cash);
        let manager = UserId::new();
        let input = RechargeWorkflow::settlement_for(&request, manager);

        assert_eq!(input.card_id, request.card_id);
        assert_eq!(input.kind, TransactionKind::Recharge);
        assert_eq!(input.amount, Credits::new(50));
        assert_eq!(input.description, "Recharge approved - cash payment");
        assert_eq!(input.actor, Some(manager));
    }
}

//! Property-based tests for the recharge state machine.

use mealcard_shared::types::{CardId, Credits, UserId};
use proptest::prelude::*;

use super::error::RechargeError;
use super::types::{PaymentInfo, RechargeRequest, RechargeStatus};
use super::workflow::RechargeWorkflow;

#[derive(Debug, Clone, Copy)]
enum Decision {
    Approve,
    Reject,
}

fn decision() -> impl Strategy<Value = Decision> {
    prop_oneof![Just(Decision::Approve), Just(Decision::Reject)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Only the first decision on a request succeeds; every later one
    /// fails with the status the first decision set.
    #[test]
    fn prop_first_decision_wins(
        amount in 1i64..10_000,
        decisions in prop::collection::vec(decision(), 1..8),
    ) {
        let mut request = RechargeRequest::pending(
            UserId::new(),
            CardId::new(),
            Credits::new(amount),
            PaymentInfo::default(),
        );

        let mut settlements = 0;
        for (i, d) in decisions.iter().enumerate() {
            let result = match d {
                Decision::Approve => RechargeWorkflow::approve(&request, UserId::new()),
                Decision::Reject => RechargeWorkflow::reject(&request, UserId::new()),
            };

            if i == 0 {
                let transition = result.unwrap();
                if transition.new_status == RechargeStatus::Approved {
                    settlements += 1;
                }
                transition.apply(&mut request, None);
            } else {
                prop_assert_eq!(
                    result,
                    Err(RechargeError::RequestNotPending { id: request.id, status: request.status })
                );
            }
        }

        prop_assert!(settlements <= 1);
        prop_assert!(request.status.is_terminal());
    }
}

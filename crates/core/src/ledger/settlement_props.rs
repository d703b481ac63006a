//! Property-based tests for settlement rules.

use chrono::Utc;
use mealcard_shared::types::{CardId, Credits, UserId};
use proptest::prelude::*;

use super::error::LedgerError;
use super::settlement::SettlementRule;
use super::types::{Card, SettlementInput, TransactionRecord};

/// A settlement request: credit when positive, debit of the absolute value otherwise.
fn operation() -> impl Strategy<Value = i64> {
    prop_oneof![1i64..500, -500i64..0]
}

fn new_card(balance: i64) -> Card {
    Card {
        id: CardId::new(),
        card_number: "CARD1".to_string(),
        student_id: UserId::new(),
        balance: Credits::new(balance),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn input_for(card_id: CardId, op: i64) -> SettlementInput {
    if op > 0 {
        SettlementInput::recharge(card_id, Credits::new(op), "Top-up", None)
    } else {
        SettlementInput::purchase(card_id, Credits::new(-op), "Meal", None)
    }
}

/// Applies `ops` the way a store would: rule first, then balance and record together.
fn replay(card: &mut Card, ops: &[i64]) -> Vec<TransactionRecord> {
    let mut log = Vec::new();
    for &op in ops {
        let input = input_for(card.id, op);
        if let Ok(balance) = SettlementRule::apply(card, &input) {
            card.balance = balance;
            log.push(SettlementRule::record(&input, balance, Utc::now()));
        }
    }
    log
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Balance never goes negative, whatever the order of operations.
    #[test]
    fn prop_balance_never_negative(
        ops in prop::collection::vec(operation(), 0..64),
    ) {
        let mut card = new_card(0);
        let log = replay(&mut card, &ops);

        prop_assert!(!card.balance.is_negative());
        for record in &log {
            prop_assert!(!record.balance_after.is_negative());
        }
    }

    /// Final balance equals the sum of the appended records.
    #[test]
    fn prop_balance_equals_log_sum(
        ops in prop::collection::vec(operation(), 0..64),
    ) {
        let mut card = new_card(0);
        let log = replay(&mut card, &ops);

        let sum: Credits = log.iter().map(|r| r.amount).sum();
        prop_assert_eq!(sum, card.balance);
        if let Some(last) = log.last() {
            prop_assert_eq!(last.balance_after, card.balance);
        }
    }

    /// A rejected debit reports the balance it was checked against.
    #[test]
    fn prop_overdraft_rejected_with_context(
        balance in 0i64..1_000,
        excess in 1i64..1_000,
    ) {
        let card = new_card(balance);
        let price = balance + excess;
        let input = SettlementInput::purchase(card.id, Credits::new(price), "Meal", None);

        prop_assert_eq!(
            SettlementRule::apply(&card, &input),
            Err(LedgerError::InsufficientFunds {
                card_id: card.id,
                balance: Credits::new(balance),
                requested: Credits::new(price),
            })
        );
    }

    /// Exactly floor(B/P) purchases of price P succeed on balance B.
    #[test]
    fn prop_sequential_purchases_floor(
        balance in 0i64..5_000,
        price in 1i64..500,
    ) {
        let mut card = new_card(balance);
        let attempts = usize::try_from(balance / price + 3).unwrap_or(0);
        let ops = vec![-price; attempts];
        let log = replay(&mut card, &ops);

        prop_assert_eq!(log.len() as i64, balance / price);
        prop_assert_eq!(card.balance, Credits::new(balance % price));
    }
}

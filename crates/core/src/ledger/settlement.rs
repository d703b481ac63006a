//! Settlement rules.
//!
//! Stores call [`SettlementRule::apply`] while holding exclusive access to the
//! card (a per-card lock or a row lock), then write the new balance and the
//! returned record in the same atomic unit. Nothing else may change a balance.

use chrono::{DateTime, Utc};
use mealcard_shared::types::{Credits, TransactionRecordId};

use crate::ledger::error::LedgerError;
use crate::ledger::types::{Card, SettlementInput, TransactionKind, TransactionRecord};

/// Stateless settlement rules.
pub struct SettlementRule;

impl SettlementRule {
    /// Checks that a delta is non-zero and its sign agrees with the kind.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidAmount` on zero or a mismatched sign.
    pub fn validate_delta(kind: TransactionKind, amount: Credits) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount {
                amount,
                reason: "amount must be non-zero",
            });
        }

        match kind {
            TransactionKind::Recharge if amount.is_negative() => Err(LedgerError::InvalidAmount {
                amount,
                reason: "recharge must credit the card",
            }),
            TransactionKind::Purchase if amount.is_positive() => Err(LedgerError::InvalidAmount {
                amount,
                reason: "purchase must debit the card",
            }),
            _ => Ok(()),
        }
    }

    /// Computes the balance after applying `input` to `card`.
    ///
    /// `card` must be the state read under exclusive access; the precondition
    /// checks are only meaningful at the moment the delta is applied.
    ///
    /// # Errors
    ///
    /// - `CardInactive` if the card is deactivated
    /// - `InvalidAmount` if the delta is zero, has the wrong sign, or overflows
    /// - `InsufficientFunds` if a debit would make the balance negative
    pub fn apply(card: &Card, input: &SettlementInput) -> Result<Credits, LedgerError> {
        if !card.is_active {
            return Err(LedgerError::CardInactive(card.id));
        }

        Self::validate_delta(input.kind, input.amount)?;

        let new_balance =
            card.balance
                .checked_add(input.amount)
                .ok_or(LedgerError::InvalidAmount {
                    amount: input.amount,
                    reason: "balance would overflow",
                })?;

        if new_balance.is_negative() {
            return Err(LedgerError::InsufficientFunds {
                card_id: card.id,
                balance: card.balance,
                requested: input.amount.saturating_abs(),
            });
        }

        Ok(new_balance)
    }

    /// Builds the log record for a settlement that produced `balance_after`.
    #[must_use]
    pub fn record(
        input: &SettlementInput,
        balance_after: Credits,
        at: DateTime<Utc>,
    ) -> TransactionRecord {
        TransactionRecord {
            id: TransactionRecordId::new(),
            card_id: input.card_id,
            kind: input.kind,
            amount: input.amount,
            description: input.description.clone(),
            processed_by: input.actor,
            balance_after,
            created_at: at,
        }
    }
}

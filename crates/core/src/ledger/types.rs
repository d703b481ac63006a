//! Ledger domain types.

use chrono::{DateTime, Utc};
use mealcard_shared::types::{CardId, Credits, TransactionRecordId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A stored-value meal card. Exactly one per student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Card ID.
    pub id: CardId,
    /// Unique, human-facing card number.
    pub card_number: String,
    /// Owning student.
    pub student_id: UserId,
    /// Spendable credits. Never negative.
    pub balance: Credits,
    /// Inactive cards reject settlement.
    pub is_active: bool,
    /// When the card was opened.
    pub created_at: DateTime<Utc>,
    /// Last balance or status change.
    pub updated_at: DateTime<Utc>,
}

/// Kind of balance-changing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Credit to the card.
    Recharge,
    /// Debit from the card.
    Purchase,
}

impl TransactionKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recharge => "recharge",
            Self::Purchase => "purchase",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "recharge" => Some(Self::Recharge),
            "purchase" => Some(Self::Purchase),
            _ => None,
        }
    }

    /// Returns true if records of this kind carry a positive amount.
    #[must_use]
    pub const fn is_credit(&self) -> bool {
        matches!(self, Self::Recharge)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable entry in the transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Record ID.
    pub id: TransactionRecordId,
    /// Card the record applies to.
    pub card_id: CardId,
    /// Recharge or purchase.
    pub kind: TransactionKind,
    /// Signed delta: positive for recharge, negative for purchase.
    pub amount: Credits,
    /// Free-text description.
    pub description: String,
    /// Actor who processed the event, if any.
    pub processed_by: Option<UserId>,
    /// Card balance immediately after this record was applied.
    pub balance_after: Credits,
    /// When the record was written.
    pub created_at: DateTime<Utc>,
}

/// Input to a single settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementInput {
    /// Card to settle against.
    pub card_id: CardId,
    /// Recharge or purchase.
    pub kind: TransactionKind,
    /// Signed delta to apply.
    pub amount: Credits,
    /// Description written to the log.
    pub description: String,
    /// Processing actor.
    pub actor: Option<UserId>,
}

impl SettlementInput {
    /// Builds a recharge (credit) of `amount`.
    #[must_use]
    pub fn recharge(
        card_id: CardId,
        amount: Credits,
        description: impl Into<String>,
        actor: Option<UserId>,
    ) -> Self {
        Self {
            card_id,
            kind: TransactionKind::Recharge,
            amount,
            description: description.into(),
            actor,
        }
    }

    /// Builds a purchase debiting `price`. The stored delta is `-price`;
    /// a price that cannot be negated is kept as-is and rejected by settlement.
    #[must_use]
    pub fn purchase(
        card_id: CardId,
        price: Credits,
        description: impl Into<String>,
        actor: Option<UserId>,
    ) -> Self {
        Self {
            card_id,
            kind: TransactionKind::Purchase,
            amount: price.checked_neg().unwrap_or(price),
            description: description.into(),
            actor,
        }
    }
}

/// Input for provisioning a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    /// Owning student.
    pub student_id: UserId,
    /// Pre-generated unique card number.
    pub card_number: String,
    /// Credits granted on opening. Written as a recharge record when non-zero.
    pub opening_grant: Credits,
    /// Actor provisioning the card.
    pub opened_by: Option<UserId>,
}

/// Ways to look up a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardLookup {
    /// By card ID.
    Id(CardId),
    /// By card number.
    Number(String),
    /// By owning student.
    Student(UserId),
}

impl fmt::Display for CardLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "card {id}"),
            Self::Number(number) => write!(f, "card number {number}"),
            Self::Student(student) => write!(f, "card of student {student}"),
        }
    }
}

/// A card together with its full log, read as one consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardStatement {
    /// Card state.
    pub card: Card,
    /// All records for the card, newest first.
    pub records: Vec<TransactionRecord>,
}

impl CardStatement {
    /// Sum of all record amounts. Equals `card.balance` for a consistent statement.
    #[must_use]
    pub fn log_total(&self) -> Credits {
        self.records.iter().map(|r| r.amount).sum()
    }

    /// Returns true if the balance equals the sum of the log.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.log_total() == self.card.balance
    }
}

/// Filter for reading the transaction log. Results are newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    /// Only records for this card.
    pub card_id: Option<CardId>,
    /// Only records of this kind.
    pub kind: Option<TransactionKind>,
    /// Inclusive lower bound on `created_at`.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`.
    pub to: Option<DateTime<Utc>>,
    /// Maximum number of records.
    pub limit: Option<u64>,
}

impl TransactionQuery {
    /// Returns true if `record` passes every filter (ignores `limit`).
    #[must_use]
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.card_id.is_none_or(|id| record.card_id == id)
            && self.kind.is_none_or(|kind| record.kind == kind)
            && self.from.is_none_or(|from| record.created_at >= from)
            && self.to.is_none_or(|to| record.created_at < to)
    }
}

/// Ledger-wide card totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CardTotals {
    /// Number of cards ever opened.
    pub cards: u64,
    /// Number of active cards.
    pub active_cards: u64,
    /// Sum of all card balances.
    pub outstanding_balance: Credits,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount: i64, kind: TransactionKind) -> TransactionRecord {
        TransactionRecord {
            id: TransactionRecordId::new(),
            card_id: CardId::new(),
            kind,
            amount: Credits::new(amount),
            description: String::new(),
            processed_by: None,
            balance_after: Credits::ZERO,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_kind_as_str_and_parse() {
        assert_eq!(TransactionKind::Recharge.as_str(), "recharge");
        assert_eq!(TransactionKind::Purchase.as_str(), "purchase");
        assert_eq!(
            TransactionKind::parse("PURCHASE"),
            Some(TransactionKind::Purchase)
        );
        assert_eq!(TransactionKind::parse("refund"), None);
    }

    #[test]
    fn test_purchase_input_negates_price() {
        let input = SettlementInput::purchase(CardId::new(), Credits::new(150), "Thali", None);
        assert_eq!(input.amount, Credits::new(-150));
        assert_eq!(input.kind, TransactionKind::Purchase);
    }

    #[test]
    fn test_statement_balance_check() {
        let card_id = CardId::new();
        let statement = CardStatement {
            card: Card {
                id: card_id,
                card_number: "CARD1".to_string(),
                student_id: UserId::new(),
                balance: Credits::new(50),
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            records: vec![
                record(200, TransactionKind::Recharge),
                record(-150, TransactionKind::Purchase),
            ],
        };
        assert_eq!(statement.log_total(), Credits::new(50));
        assert!(statement.is_balanced());
    }

    #[test]
    fn test_query_matches_window_and_kind() {
        let r = record(-10, TransactionKind::Purchase);
        let query = TransactionQuery {
            kind: Some(TransactionKind::Purchase),
            from: Some(r.created_at),
            to: Some(r.created_at + chrono::Duration::seconds(1)),
            ..Default::default()
        };
        assert!(query.matches(&r));

        let exclusive_end = TransactionQuery {
            to: Some(r.created_at),
            ..Default::default()
        };
        assert!(!exclusive_end.matches(&r));

        let other_card = TransactionQuery {
            card_id: Some(CardId::new()),
            ..Default::default()
        };
        assert!(!other_card.matches(&r));
    }
}

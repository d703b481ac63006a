//! Card repository: card rows, the transaction log and settlement.
//!
//! Settlement locks the card row with `SELECT ... FOR UPDATE` inside a
//! database transaction, applies [`SettlementRule`] to the locked state, then
//! writes the balance and the record before commit. Conflicting settlements on
//! one card serialize on the row lock; different cards never contend.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::debug;

use mealcard_core::ledger::{
    Card, CardLookup, CardStatement, CardTotals, LedgerError, LedgerStore, NewCard,
    SettlementInput, SettlementRule, TransactionKind, TransactionQuery, TransactionRecord,
};
use mealcard_shared::types::{CardId, Credits, TransactionRecordId, UserId};

use super::to_utc;
use crate::entities::{
    cards, sea_orm_active_enums::TransactionKind as DbTransactionKind, transaction_records,
};

/// Unique constraint on `cards.card_number`, named in the initial migration.
const CARD_NUMBER_CONSTRAINT: &str = "uq_cards_card_number";

/// Card repository implementation.
#[derive(Debug, Clone)]
pub struct CardRepository {
    db: DatabaseConnection,
}

impl CardRepository {
    /// Creates a new card repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl LedgerStore for CardRepository {
    async fn open_card(&self, input: NewCard) -> Result<Card, LedgerError> {
        let now = Utc::now();
        let mut card = Card {
            id: CardId::new(),
            card_number: input.card_number.clone(),
            student_id: input.student_id,
            balance: Credits::ZERO,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let grant = input.opening_grant.is_positive().then(|| {
            SettlementInput::recharge(
                card.id,
                input.opening_grant,
                "Opening balance",
                input.opened_by,
            )
        });
        let grant_record = match &grant {
            Some(grant) => {
                let balance = SettlementRule::apply(&card, grant)?;
                card.balance = balance;
                Some(SettlementRule::record(grant, balance, now))
            }
            None => None,
        };

        let txn = self.db.begin().await.map_err(store_err)?;

        cards::ActiveModel {
            id: Set(card.id.into_inner()),
            card_number: Set(card.card_number.clone()),
            student_id: Set(card.student_id.into_inner()),
            balance: Set(card.balance.units()),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| open_err(e, &input))?;

        if let Some(record) = &grant_record {
            insert_record(&txn, record).await?;
        }

        txn.commit().await.map_err(store_err)?;
        Ok(card)
    }

    async fn find_card(&self, lookup: &CardLookup) -> Result<Option<Card>, LedgerError> {
        let query = match lookup {
            CardLookup::Id(id) => cards::Entity::find_by_id(id.into_inner()),
            CardLookup::Number(number) => {
                cards::Entity::find().filter(cards::Column::CardNumber.eq(number.as_str()))
            }
            CardLookup::Student(student) => {
                cards::Entity::find().filter(cards::Column::StudentId.eq(student.into_inner()))
            }
        };

        let model = query.one(&self.db).await.map_err(store_err)?;
        Ok(model.map(card_to_domain))
    }

    async fn set_card_active(&self, card_id: CardId, is_active: bool) -> Result<Card, LedgerError> {
        let model = cards::Entity::find_by_id(card_id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?
            .ok_or(LedgerError::CardNotFound(CardLookup::Id(card_id)))?;

        let mut active: cards::ActiveModel = model.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await.map_err(store_err)?;
        Ok(card_to_domain(updated))
    }

    async fn settle(&self, input: SettlementInput) -> Result<TransactionRecord, LedgerError> {
        let txn = self.db.begin().await.map_err(store_err)?;
        let record = settle_in_txn(&txn, &input).await?;
        txn.commit().await.map_err(store_err)?;
        Ok(record)
    }

    async fn statement(&self, card_id: CardId) -> Result<CardStatement, LedgerError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        // Shared row lock holds off settlement until the log is read.
        let card = cards::Entity::find_by_id(card_id.into_inner())
            .lock_shared()
            .one(&txn)
            .await
            .map_err(store_err)?
            .ok_or(LedgerError::CardNotFound(CardLookup::Id(card_id)))?;

        let records = transaction_records::Entity::find()
            .filter(transaction_records::Column::CardId.eq(card_id.into_inner()))
            .order_by_desc(transaction_records::Column::CreatedAt)
            .order_by_desc(transaction_records::Column::Id)
            .all(&txn)
            .await
            .map_err(store_err)?;

        txn.commit().await.map_err(store_err)?;

        Ok(CardStatement {
            card: card_to_domain(card),
            records: records.into_iter().map(record_to_domain).collect(),
        })
    }

    async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        let mut select = transaction_records::Entity::find();

        if let Some(card_id) = query.card_id {
            select = select.filter(transaction_records::Column::CardId.eq(card_id.into_inner()));
        }
        if let Some(kind) = query.kind {
            select = select.filter(transaction_records::Column::Kind.eq(kind_to_db(kind)));
        }
        if let Some(from) = query.from {
            select = select.filter(transaction_records::Column::CreatedAt.gte(from));
        }
        if let Some(to) = query.to {
            select = select.filter(transaction_records::Column::CreatedAt.lt(to));
        }

        select = select
            .order_by_desc(transaction_records::Column::CreatedAt)
            .order_by_desc(transaction_records::Column::Id);
        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        let records = select.all(&self.db).await.map_err(store_err)?;
        Ok(records.into_iter().map(record_to_domain).collect())
    }

    async fn card_totals(&self) -> Result<CardTotals, LedgerError> {
        let row: Option<(i64, i64, i64)> = cards::Entity::find()
            .select_only()
            .column_as(Expr::cust("COUNT(*)"), "cards")
            .column_as(Expr::cust("COUNT(*) FILTER (WHERE is_active)"), "active_cards")
            .column_as(
                Expr::cust("COALESCE(SUM(balance), 0)::BIGINT"),
                "outstanding_balance",
            )
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(store_err)?;

        let (cards, active_cards, outstanding) = row.unwrap_or_default();
        Ok(CardTotals {
            cards: u64::try_from(cards).unwrap_or_default(),
            active_cards: u64::try_from(active_cards).unwrap_or_default(),
            outstanding_balance: Credits::new(outstanding),
        })
    }
}

/// Applies one settlement inside an open database transaction.
///
/// The caller commits. Used directly by recharge approval so that the status
/// change and the settlement share one transaction.
pub(crate) async fn settle_in_txn<C: ConnectionTrait>(
    conn: &C,
    input: &SettlementInput,
) -> Result<TransactionRecord, LedgerError> {
    let model = cards::Entity::find_by_id(input.card_id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(store_err)?
        .ok_or(LedgerError::CardNotFound(CardLookup::Id(input.card_id)))?;

    debug!(card_id = %input.card_id, "Card row locked for settlement");

    let card = card_to_domain(model.clone());
    let balance = SettlementRule::apply(&card, input)?;
    let now = Utc::now();
    let record = SettlementRule::record(input, balance, now);

    let mut active: cards::ActiveModel = model.into();
    active.balance = Set(balance.units());
    active.updated_at = Set(now.into());
    active.update(conn).await.map_err(store_err)?;

    insert_record(conn, &record).await?;
    Ok(record)
}

async fn insert_record<C: ConnectionTrait>(
    conn: &C,
    record: &TransactionRecord,
) -> Result<(), LedgerError> {
    transaction_records::ActiveModel {
        id: Set(record.id.into_inner()),
        card_id: Set(record.card_id.into_inner()),
        kind: Set(kind_to_db(record.kind)),
        amount: Set(record.amount.units()),
        description: Set(record.description.clone()),
        processed_by: Set(record.processed_by.map(UserId::into_inner)),
        balance_after: Set(record.balance_after.units()),
        created_at: Set(record.created_at.into()),
    }
    .insert(conn)
    .await
    .map_err(store_err)?;
    Ok(())
}

pub(crate) fn store_err(e: DbErr) -> LedgerError {
    debug!(error = %e, "Card store query failed");
    LedgerError::StoreUnavailable(e.to_string())
}

fn open_err(e: DbErr, input: &NewCard) -> LedgerError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => unique_violation(&msg, input),
        _ => store_err(e),
    }
}

/// Tells a card number clash apart from a second card for the student.
fn unique_violation(message: &str, input: &NewCard) -> LedgerError {
    if message.contains(CARD_NUMBER_CONSTRAINT) {
        LedgerError::CardNumberTaken(input.card_number.clone())
    } else {
        LedgerError::CardAlreadyExists(input.student_id)
    }
}

fn card_to_domain(model: cards::Model) -> Card {
    Card {
        id: CardId::from_uuid(model.id),
        card_number: model.card_number,
        student_id: UserId::from_uuid(model.student_id),
        balance: Credits::new(model.balance),
        is_active: model.is_active,
        created_at: to_utc(model.created_at),
        updated_at: to_utc(model.updated_at),
    }
}

fn record_to_domain(model: transaction_records::Model) -> TransactionRecord {
    TransactionRecord {
        id: TransactionRecordId::from_uuid(model.id),
        card_id: CardId::from_uuid(model.card_id),
        kind: kind_from_db(model.kind),
        amount: Credits::new(model.amount),
        description: model.description,
        processed_by: model.processed_by.map(UserId::from_uuid),
        balance_after: Credits::new(model.balance_after),
        created_at: to_utc(model.created_at),
    }
}

const fn kind_to_db(kind: TransactionKind) -> DbTransactionKind {
    match kind {
        TransactionKind::Recharge => DbTransactionKind::Recharge,
        TransactionKind::Purchase => DbTransactionKind::Purchase,
    }
}

const fn kind_from_db(kind: DbTransactionKind) -> TransactionKind {
    match kind {
        DbTransactionKind::Recharge => TransactionKind::Recharge,
        DbTransactionKind::Purchase => TransactionKind::Purchase,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_card() -> NewCard {
        NewCard {
            student_id: UserId::new(),
            card_number: "CARD1700000000000-k3v9q0z1a".to_string(),
            opening_grant: Credits::ZERO,
            opened_by: None,
        }
    }

    #[test]
    fn test_number_clash_maps_to_number_taken() {
        let input = new_card();
        let message = "duplicate key value violates unique constraint \"uq_cards_card_number\"";
        assert_eq!(
            unique_violation(message, &input),
            LedgerError::CardNumberTaken(input.card_number.clone())
        );
    }

    #[test]
    fn test_student_clash_maps_to_already_exists() {
        let input = new_card();
        let message = "duplicate key value violates unique constraint \"uq_cards_student_id\"";
        assert_eq!(
            unique_violation(message, &input),
            LedgerError::CardAlreadyExists(input.student_id)
        );
    }
}

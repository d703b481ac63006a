//! Initial schema: cards, transaction log, recharge requests and menu.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(TABLES_SQL).await?;
        db.execute_unprepared(INDEXES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE transaction_kind AS ENUM ('recharge', 'purchase');
CREATE TYPE recharge_status AS ENUM ('pending', 'approved', 'rejected');
CREATE TYPE payment_method AS ENUM ('online', 'cash', 'upi');
";

const TABLES_SQL: &str = r"
-- One card per student. balance is only written by settlement.
CREATE TABLE cards (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    card_number VARCHAR(64) NOT NULL CONSTRAINT uq_cards_card_number UNIQUE,
    student_id UUID NOT NULL CONSTRAINT uq_cards_student_id UNIQUE,
    balance BIGINT NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_balance_non_negative CHECK (balance >= 0)
);

-- Append-only log. Sum of amount per card equals cards.balance.
CREATE TABLE transaction_records (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    card_id UUID NOT NULL REFERENCES cards(id) ON DELETE RESTRICT,
    kind transaction_kind NOT NULL,
    amount BIGINT NOT NULL,
    description TEXT NOT NULL,
    processed_by UUID,
    balance_after BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_amount_sign CHECK (
        (kind = 'recharge' AND amount > 0) OR (kind = 'purchase' AND amount < 0)
    ),
    CONSTRAINT chk_balance_after_non_negative CHECK (balance_after >= 0)
);

CREATE TABLE recharge_requests (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    student_id UUID NOT NULL,
    card_id UUID NOT NULL REFERENCES cards(id) ON DELETE RESTRICT,
    amount BIGINT NOT NULL,
    payment_method payment_method NOT NULL DEFAULT 'upi',
    payment_transaction_id TEXT,
    upi_reference TEXT,
    proof_reference TEXT,
    status recharge_status NOT NULL DEFAULT 'pending',
    requested_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    processed_by UUID,
    processed_at TIMESTAMPTZ,
    record_id UUID REFERENCES transaction_records(id),
    CONSTRAINT chk_request_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_approved_has_record CHECK (
        (status = 'approved') = (record_id IS NOT NULL)
    ),
    CONSTRAINT chk_decided_is_stamped CHECK (
        (status = 'pending') = (processed_at IS NULL)
    )
);

CREATE TABLE menu_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    price BIGINT NOT NULL,
    category VARCHAR(64) NOT NULL,
    description TEXT,
    image TEXT,
    is_available BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_price_positive CHECK (price > 0)
);
";

const INDEXES_SQL: &str = r"
-- Card statement and admin feed
CREATE INDEX idx_transaction_records_card ON transaction_records(card_id, created_at DESC);
CREATE INDEX idx_transaction_records_created ON transaction_records(created_at DESC);

-- Manager queue and student history
CREATE INDEX idx_recharge_requests_status ON recharge_requests(status, requested_at DESC);
CREATE INDEX idx_recharge_requests_student ON recharge_requests(student_id, requested_at DESC);

CREATE INDEX idx_menu_items_available ON menu_items(category, name) WHERE is_available;
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS recharge_requests CASCADE;
DROP TABLE IF EXISTS transaction_records CASCADE;
DROP TABLE IF EXISTS cards CASCADE;
DROP TABLE IF EXISTS menu_items CASCADE;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS recharge_status;
DROP TYPE IF EXISTS transaction_kind;
";

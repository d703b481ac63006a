//! `SeaORM` Entity for recharge_requests table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{PaymentMethod, RechargeStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "recharge_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub student_id: Uuid,
    pub card_id: Uuid,
    pub amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_transaction_id: Option<String>,
    pub upi_reference: Option<String>,
    pub proof_reference: Option<String>,
    pub status: RechargeStatus,
    pub requested_at: DateTimeWithTimeZone,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<DateTimeWithTimeZone>,
    pub record_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cards::Entity",
        from = "Column::CardId",
        to = "super::cards::Column::Id"
    )]
    Cards,
    #[sea_orm(
        belongs_to = "super::transaction_records::Entity",
        from = "Column::RecordId",
        to = "super::transaction_records::Column::Id"
    )]
    TransactionRecords,
}

impl Related<super::cards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cards.def()
    }
}

impl Related<super::transaction_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! `SeaORM` Entity for cards table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub card_number: String,
    #[sea_orm(unique)]
    pub student_id: Uuid,
    pub balance: i64,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction_records::Entity")]
    TransactionRecords,
    #[sea_orm(has_many = "super::recharge_requests::Entity")]
    RechargeRequests,
}

impl Related<super::transaction_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionRecords.def()
    }
}

impl Related<super::recharge_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RechargeRequests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

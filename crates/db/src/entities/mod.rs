//! `SeaORM` entity definitions.

pub mod cards;
pub mod menu_items;
pub mod recharge_requests;
pub mod sea_orm_active_enums;
pub mod transaction_records;

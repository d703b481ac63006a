//! PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `transaction_kind` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_kind")]
pub enum TransactionKind {
    /// Credit.
    #[sea_orm(string_value = "recharge")]
    Recharge,
    /// Debit.
    #[sea_orm(string_value = "purchase")]
    Purchase,
}

/// `recharge_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "recharge_status")]
pub enum RechargeStatus {
    /// Awaiting decision.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved and settled.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// `payment_method` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
pub enum PaymentMethod {
    /// Online gateway.
    #[sea_orm(string_value = "online")]
    Online,
    /// Cash.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// UPI transfer.
    #[sea_orm(string_value = "upi")]
    Upi,
}

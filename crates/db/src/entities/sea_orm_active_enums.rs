//! `SeaORM` active enums mapped to PostgreSQL enum types.

use bankdesk_core::customer::AccountType as CoreAccountType;
use bankdesk_core::ledger::MovementKind as CoreMovementKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "savings")]
    Savings,
    #[sea_orm(string_value = "checking")]
    Checking,
}

impl From<CoreAccountType> for AccountType {
    fn from(value: CoreAccountType) -> Self {
        match value {
            CoreAccountType::Savings => Self::Savings,
            CoreAccountType::Checking => Self::Checking,
        }
    }
}

impl From<AccountType> for CoreAccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Savings => Self::Savings,
            AccountType::Checking => Self::Checking,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_kind")]
pub enum MovementKind {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

impl From<CoreMovementKind> for MovementKind {
    fn from(value: CoreMovementKind) -> Self {
        match value {
            CoreMovementKind::Debit => Self::Debit,
            CoreMovementKind::Credit => Self::Credit,
        }
    }
}

impl From<MovementKind> for CoreMovementKind {
    fn from(value: MovementKind) -> Self {
        match value {
            MovementKind::Debit => Self::Debit,
            MovementKind::Credit => Self::Credit,
        }
    }
}

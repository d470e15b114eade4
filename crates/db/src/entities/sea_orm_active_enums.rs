//! `SeaORM` active enums mirroring the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
pub enum EntryStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "posted")]
    Posted,
    #[sea_orm(string_value = "void")]
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_source")]
pub enum EntrySource {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "invoice")]
    Invoice,
    #[sea_orm(string_value = "receipt")]
    Receipt,
    #[sea_orm(string_value = "import")]
    Import,
}

impl From<tally_core::accounts::AccountType> for AccountType {
    fn from(value: tally_core::accounts::AccountType) -> Self {
        use tally_core::accounts::AccountType as Core;
        match value {
            Core::Asset => Self::Asset,
            Core::Liability => Self::Liability,
            Core::Equity => Self::Equity,
            Core::Income => Self::Income,
            Core::Expense => Self::Expense,
        }
    }
}

impl From<AccountType> for tally_core::accounts::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Income => Self::Income,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<tally_core::ledger::EntryStatus> for EntryStatus {
    fn from(value: tally_core::ledger::EntryStatus) -> Self {
        use tally_core::ledger::EntryStatus as Core;
        match value {
            Core::Draft => Self::Draft,
            Core::Posted => Self::Posted,
            Core::Void => Self::Void,
        }
    }
}

impl From<EntryStatus> for tally_core::ledger::EntryStatus {
    fn from(value: EntryStatus) -> Self {
        match value {
            EntryStatus::Draft => Self::Draft,
            EntryStatus::Posted => Self::Posted,
            EntryStatus::Void => Self::Void,
        }
    }
}

impl From<tally_core::ledger::EntrySource> for EntrySource {
    fn from(value: tally_core::ledger::EntrySource) -> Self {
        use tally_core::ledger::EntrySource as Core;
        match value {
            Core::Manual => Self::Manual,
            Core::Invoice => Self::Invoice,
            Core::Receipt => Self::Receipt,
            Core::Import => Self::Import,
        }
    }
}

impl From<EntrySource> for tally_core::ledger::EntrySource {
    fn from(value: EntrySource) -> Self {
        match value {
            EntrySource::Manual => Self::Manual,
            EntrySource::Invoice => Self::Invoice,
            EntrySource::Receipt => Self::Receipt,
            EntrySource::Import => Self::Import,
        }
    }
}

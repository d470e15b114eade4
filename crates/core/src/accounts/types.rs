//! Chart of accounts domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CompanyId};

/// Account type classification.
///
/// The type decides the account's normal balance, which in turn decides the
/// sign of every balance and running balance computed for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned by the company.
    Asset,
    /// Obligations owed to others.
    Liability,
    /// Owners' residual interest.
    Equity,
    /// Revenue earned.
    Income,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All account types, in chart order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Income,
        Self::Expense,
    ];

    /// Returns the normal balance side for this account type.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Income => NormalBalance::Credit,
        }
    }

    /// Returns the lowercase name used in storage and APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "income" | "revenue" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown account type: {s}")),
        }
    }
}

/// Normal balance side of an account.
///
/// - Debit-normal (asset, expense): balance = debit - credit
/// - Credit-normal (liability, equity, income): balance = credit - debit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debits increase the balance.
    Debit,
    /// Credits increase the balance.
    Credit,
}

impl NormalBalance {
    /// Signed balance movement of a debit/credit pair.
    #[must_use]
    pub fn movement(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// An account in a company's chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Account code, unique within the company.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional second-language display name.
    pub localized_name: Option<String>,
    /// Account type.
    pub account_type: AccountType,
    /// Whether this account collects VAT.
    pub is_vat_account: bool,
    /// System accounts are seeded at onboarding and cannot be archived or deleted.
    pub is_system_account: bool,
    /// Whether new postings may target this account.
    pub is_active: bool,
    /// Soft-deleted.
    pub is_archived: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Returns the normal balance side of this account.
    #[must_use]
    pub const fn normal_balance(&self) -> NormalBalance {
        self.account_type.normal_balance()
    }

    /// Returns true if new lines may be posted to this account.
    #[must_use]
    pub const fn accepts_postings(&self) -> bool {
        self.is_active && !self.is_archived
    }
}

/// Input for creating an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    /// Owning company.
    pub company_id: CompanyId,
    /// Account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional second-language display name.
    #[serde(default)]
    pub localized_name: Option<String>,
    /// Account type.
    pub account_type: AccountType,
    /// Whether this account collects VAT.
    #[serde(default)]
    pub is_vat_account: bool,
    /// Whether this is a system account.
    #[serde(default)]
    pub is_system_account: bool,
}

/// Explicit update for an account. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountUpdate {
    /// New code (must stay unique within the company).
    pub code: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New second-language name (`Some(None)` clears it).
    pub localized_name: Option<Option<String>>,
    /// New account type (only while the account has no lines).
    pub account_type: Option<AccountType>,
    /// VAT flag.
    pub is_vat_account: Option<bool>,
    /// Active flag.
    pub is_active: Option<bool>,
}

impl AccountUpdate {
    /// Returns true if the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_none()
            && self.name.is_none()
            && self.localized_name.is_none()
            && self.account_type.is_none()
            && self.is_vat_account.is_none()
            && self.is_active.is_none()
    }
}

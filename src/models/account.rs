//! Defines the account record and its enums.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::{DatabaseID, UserId};

/// The kind of financial account a balance is tracked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// An everyday checking account.
    Checking,
    /// A savings account.
    Savings,
    /// A credit card account. Balances are typically negative.
    CreditCard,
    /// Physical cash.
    Cash,
    /// A generic bank account that fits none of the other kinds.
    Bank,
}

impl AccountType {
    /// The database text representation of the account type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::CreditCard => "credit_card",
            AccountType::Cash => "cash",
            AccountType::Bank => "bank",
        }
    }

    /// Parse the database text representation of the account type.
    pub fn from_str(text: &str) -> Option<Self> {
        match text {
            "checking" => Some(AccountType::Checking),
            "savings" => Some(AccountType::Savings),
            "credit_card" => Some(AccountType::CreditCard),
            "cash" => Some(AccountType::Cash),
            "bank" => Some(AccountType::Bank),
            _ => None,
        }
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|text| {
            AccountType::from_str(text)
                .ok_or_else(|| FromSqlError::Other(format!("invalid account type {text:?}").into()))
        })
    }
}

/// A financial account and its current balance.
///
/// The balance is derived state: it starts at the opening balance given on
/// creation and is only changed as a side effect of creating, updating or
/// deleting transactions that reference the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The ID of the account.
    pub id: DatabaseID,
    /// The display name of the account.
    pub name: String,
    /// The kind of account.
    pub kind: AccountType,
    /// The current balance.
    pub balance: f64,
    /// The user the account belongs to.
    pub owner: UserId,
}

/// The data required to create an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    /// The display name of the account.
    pub name: String,
    /// The kind of account.
    pub kind: AccountType,
    /// The opening balance. Zero for a fresh account.
    pub balance: f64,
    /// The user the account belongs to.
    pub owner: UserId,
}

/// The fields of an account that may be edited directly.
///
/// The balance is deliberately absent, it can only be changed through
/// transaction side effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountUpdate {
    /// The new display name.
    pub name: String,
    /// The new account kind.
    pub kind: AccountType,
}

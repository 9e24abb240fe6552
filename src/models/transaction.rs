//! Defines the transaction record and its enums.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Date;

use super::{DatabaseID, UserId};

/// Whether a transaction adds money to or removes money from an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money coming in, e.g. salary or interest.
    Income,
    /// Money going out, e.g. groceries or rent.
    Expense,
}

impl TransactionType {
    /// The database text representation of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Parse the database text representation of the type.
    pub fn from_str(text: &str) -> Option<Self> {
        match text {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|text| {
            TransactionType::from_str(text).ok_or_else(|| {
                FromSqlError::Other(format!("invalid transaction type {text:?}").into())
            })
        })
    }
}

/// The lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// The transaction has settled. This is the default.
    Completed,
    /// The transaction has been recorded but not yet settled.
    Pending,
    /// The transaction was cancelled.
    Cancelled,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Completed
    }
}

impl TransactionStatus {
    /// The database text representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Cancelled => "cancelled",
        }
    }

    /// Parse the database text representation of the status.
    pub fn from_str(text: &str) -> Option<Self> {
        match text {
            "completed" => Some(TransactionStatus::Completed),
            "pending" => Some(TransactionStatus::Pending),
            "cancelled" => Some(TransactionStatus::Cancelled),
            _ => None,
        }
    }
}

impl ToSql for TransactionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|text| {
            TransactionStatus::from_str(text).ok_or_else(|| {
                FromSqlError::Other(format!("invalid transaction status {text:?}").into())
            })
        })
    }
}

/// A single movement of money, recorded against a category and optionally
/// an account.
///
/// The amount is always a positive magnitude, the direction is carried by
/// the transaction type. Use [Transaction::signed_amount] for arithmetic
/// against account balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseID,
    /// What the transaction was for.
    pub description: String,
    /// The unsigned amount of money moved.
    pub amount: f64,
    /// The date the transaction occurred.
    pub date: Date,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionType,
    /// The ID of the category the transaction belongs to.
    pub category_id: DatabaseID,
    /// The ID of the account the transaction affects, if any.
    pub account_id: Option<DatabaseID>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// A URL to a receipt image stored elsewhere.
    pub receipt_url: Option<String>,
    /// The lifecycle state of the transaction.
    pub status: TransactionStatus,
    /// The user the transaction belongs to.
    pub owner: UserId,
}

impl Transaction {
    /// The effect of the transaction on an account balance: positive for
    /// income, negative for expenses.
    pub fn signed_amount(&self) -> f64 {
        signed_amount(self.amount, self.kind)
    }
}

/// The data required to create a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// What the transaction was for.
    pub description: String,
    /// The unsigned amount of money moved. Must be greater than zero.
    pub amount: f64,
    /// The date the transaction occurred.
    pub date: Date,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionType,
    /// The ID of the category the transaction belongs to.
    pub category_id: DatabaseID,
    /// The ID of the account the transaction affects, if any.
    pub account_id: Option<DatabaseID>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// A URL to a receipt image stored elsewhere.
    pub receipt_url: Option<String>,
    /// The lifecycle state of the transaction.
    pub status: TransactionStatus,
    /// The user the transaction belongs to.
    pub owner: UserId,
}

impl NewTransaction {
    /// The effect the transaction will have on an account balance.
    pub fn signed_amount(&self) -> f64 {
        signed_amount(self.amount, self.kind)
    }
}

fn signed_amount(amount: f64, kind: TransactionType) -> f64 {
    match kind {
        TransactionType::Income => amount,
        TransactionType::Expense => -amount,
    }
}

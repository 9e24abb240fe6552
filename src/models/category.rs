//! Defines the category record and its enums.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::{DatabaseID, UserId};

/// Whether a category groups income or expenses.
///
/// This is presentation metadata. The library does not require that a
/// transaction's type matches its category's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    /// Groups income transactions.
    Income,
    /// Groups expense transactions.
    Expense,
}

impl CategoryType {
    /// The database text representation of the category type.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Expense => "expense",
        }
    }

    /// Parse the database text representation of the category type.
    pub fn from_str(text: &str) -> Option<Self> {
        match text {
            "income" => Some(CategoryType::Income),
            "expense" => Some(CategoryType::Expense),
            _ => None,
        }
    }
}

impl ToSql for CategoryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for CategoryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|text| {
            CategoryType::from_str(text).ok_or_else(|| {
                FromSqlError::Other(format!("invalid category type {text:?}").into())
            })
        })
    }
}

/// A user-defined grouping for transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: DatabaseID,
    /// The display name of the category.
    pub name: String,
    /// An optional icon identifier for the UI.
    pub icon: Option<String>,
    /// An optional display colour for the UI.
    pub color: Option<String>,
    /// Whether the category groups income or expenses.
    pub kind: CategoryType,
    /// The user the category belongs to.
    pub owner: UserId,
}

/// The data required to create a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    /// The display name of the category.
    pub name: String,
    /// An optional icon identifier for the UI.
    pub icon: Option<String>,
    /// An optional display colour for the UI.
    pub color: Option<String>,
    /// Whether the category groups income or expenses.
    pub kind: CategoryType,
    /// The user the category belongs to.
    pub owner: UserId,
}

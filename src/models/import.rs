//! Defines the import record, its enums and its JSON metadata.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{DatabaseID, UserId};

/// The kind of statement an import was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// A CSV export of a bank account statement.
    BankStatement,
    /// A CSV export of a credit card statement.
    CreditCard,
}

impl ImportKind {
    /// The database text representation of the import kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::BankStatement => "bank_statement",
            ImportKind::CreditCard => "credit_card",
        }
    }

    /// Parse the database text representation of the import kind.
    pub fn from_str(text: &str) -> Option<Self> {
        match text {
            "bank_statement" => Some(ImportKind::BankStatement),
            "credit_card" => Some(ImportKind::CreditCard),
            _ => None,
        }
    }
}

impl ToSql for ImportKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for ImportKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|text| {
            ImportKind::from_str(text)
                .ok_or_else(|| FromSqlError::Other(format!("invalid import kind {text:?}").into()))
        })
    }
}

/// The lifecycle state of an import.
///
/// Every import starts in [ImportStatus::Processing] and moves to exactly
/// one of the terminal states. Terminal states are final, the store
/// rejects any further status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    /// The import is still being processed.
    Processing,
    /// Every row was either imported or skipped as a duplicate.
    Completed,
    /// Some rows were imported, but at least one row failed.
    CompletedWithErrors,
    /// The pipeline failed before rows could be processed.
    Failed,
}

impl ImportStatus {
    /// Whether the status is final.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ImportStatus::Processing)
    }

    /// The database text representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Processing => "processing",
            ImportStatus::Completed => "completed",
            ImportStatus::CompletedWithErrors => "completed_with_errors",
            ImportStatus::Failed => "failed",
        }
    }

    /// Parse the database text representation of the status.
    pub fn from_str(text: &str) -> Option<Self> {
        match text {
            "processing" => Some(ImportStatus::Processing),
            "completed" => Some(ImportStatus::Completed),
            "completed_with_errors" => Some(ImportStatus::CompletedWithErrors),
            "failed" => Some(ImportStatus::Failed),
            _ => None,
        }
    }
}

impl ToSql for ImportStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for ImportStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().and_then(|text| {
            ImportStatus::from_str(text).ok_or_else(|| {
                FromSqlError::Other(format!("invalid import status {text:?}").into())
            })
        })
    }
}

/// Structured metadata recorded against an import, stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportMetadata {
    /// The institution hint supplied by the caller, e.g. "chase".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    /// The IDs of the transactions created by this import, in row order.
    #[serde(default)]
    pub transaction_ids: Vec<DatabaseID>,
    /// Human-readable descriptions of rows that failed to import.
    #[serde(default)]
    pub errors: Vec<String>,
    /// How many rows were skipped as duplicates of existing transactions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicates_skipped: Option<u32>,
    /// The cause of a failed import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A record of one statement import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    /// The ID of the import.
    pub id: DatabaseID,
    /// The name or location of the statement file.
    pub filename: String,
    /// The size of the statement file in bytes, when known.
    pub filesize: Option<i64>,
    /// The kind of statement the import was created from.
    pub kind: ImportKind,
    /// When the import was started.
    pub date_imported: OffsetDateTime,
    /// How many transactions the import created.
    pub transaction_count: i64,
    /// The lifecycle state of the import.
    pub status: ImportStatus,
    /// The user the import belongs to.
    pub owner: UserId,
    /// Structured metadata about the import outcome.
    pub metadata: ImportMetadata,
}

/// The data required to create an import record.
///
/// Imports are always created in [ImportStatus::Processing].
#[derive(Debug, Clone, PartialEq)]
pub struct NewImport {
    /// The name or location of the statement file.
    pub filename: String,
    /// The size of the statement file in bytes, when known.
    pub filesize: Option<i64>,
    /// The kind of statement the import is created from.
    pub kind: ImportKind,
    /// The user the import belongs to.
    pub owner: UserId,
    /// Initial metadata, e.g. the institution hint.
    pub metadata: ImportMetadata,
}

/// The fields of an import record that may change after creation.
///
/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportUpdate {
    /// The new lifecycle state.
    pub status: Option<ImportStatus>,
    /// The new transaction count.
    pub transaction_count: Option<i64>,
    /// Replacement metadata.
    pub metadata: Option<ImportMetadata>,
}

/// The outcome of a successful import, returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    /// The ID of the import record.
    pub import_id: DatabaseID,
    /// How many transactions were created.
    pub transactions_imported: usize,
    /// How many rows were skipped as duplicates.
    pub duplicates_skipped: usize,
    /// Human-readable descriptions of rows that failed to import.
    pub errors: Vec<String>,
}

#[cfg(test)]
mod import_status_tests {
    use super::ImportStatus;

    #[test]
    fn processing_is_not_terminal() {
        assert!(!ImportStatus::Processing.is_terminal());
    }

    #[test]
    fn completion_states_are_terminal() {
        assert!(ImportStatus::Completed.is_terminal());
        assert!(ImportStatus::CompletedWithErrors.is_terminal());
        assert!(ImportStatus::Failed.is_terminal());
    }
}

//! Defines the crate level error type and its conversions.

/// The errors that may occur in the library.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found, or belongs to another user.
    ///
    /// Callers at an HTTP boundary should map this to 404 Not Found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A zero or negative amount was used to create a transaction.
    ///
    /// Amounts are unsigned magnitudes, the direction of the money flow is
    /// carried by the transaction type.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    InvalidAmount(f64),

    /// The category ID used to create a transaction did not match a
    /// category owned by the same user.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory,

    /// The owner on an input record did not match the user performing the
    /// operation.
    ///
    /// Callers at an HTTP boundary should map this to 403 Forbidden.
    #[error("the record owner does not match the requesting user")]
    OwnerMismatch,

    /// Tried to delete an account that still has transactions referencing
    /// it.
    ///
    /// Callers at an HTTP boundary should map this to 409 Conflict.
    #[error("the account still has transactions and cannot be deleted")]
    AccountInUse,

    /// Tried to change the status of an import record that has already
    /// reached a terminal status.
    #[error("the import has already been finalised")]
    ImportFinalised,

    /// The statement file had issues that prevented it from being parsed.
    #[error("could not parse the statement: {0}")]
    InvalidStatement(String),

    /// The import pipeline failed before any rows could be processed.
    ///
    /// The import record is transitioned to the failed status and the
    /// underlying cause is recorded in its metadata.
    #[error("failed to process import: {0}")]
    ImportFailed(String),

    /// The statement content could not be fetched from its source.
    #[error("could not fetch statement content: {0}")]
    SourceUnavailable(String),

    /// An error occurred while serializing or deserializing JSON metadata.
    #[error("could not process JSON metadata: {0}")]
    JsonError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::JsonError(value.to_string())
    }
}

//! Defines the import store trait.

use crate::{
    Error,
    models::{DatabaseID, Import, ImportUpdate, NewImport, UserId},
};

/// Handles the creation and retrieval of import records.
pub trait ImportStore {
    /// Create a new import record in the processing status.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn create(&self, new_import: NewImport) -> Result<Import, Error>;

    /// Retrieve the import `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to an import owned by
    ///   `owner`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID, owner: &UserId) -> Result<Import, Error>;

    /// Retrieve all of the owner's imports, most recent first.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn get_all(&self, owner: &UserId) -> Result<Vec<Import>, Error>;

    /// Apply `update` to the import `id`. Fields left as `None` keep their
    /// stored value.
    ///
    /// Status changes are rejected once the import has reached a terminal
    /// status, so an import is finalised exactly once.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to an import owned by
    ///   `owner`,
    /// - [Error::ImportFinalised] if `update` changes the status of an
    ///   import that already has a terminal status,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&self, id: DatabaseID, update: ImportUpdate, owner: &UserId)
    -> Result<Import, Error>;

    /// Delete the import record `id`.
    ///
    /// This removes the record only. Use
    /// [Importer::delete_import](crate::import::Importer::delete_import) to
    /// also remove the transactions the import created.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to an import owned by
    ///   `owner`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&self, id: DatabaseID, owner: &UserId) -> Result<(), Error>;
}

//! Defines the category store trait.

use crate::{
    Error,
    models::{Category, DatabaseID, NewCategory, UserId},
};

/// Handles the creation and retrieval of categories.
pub trait CategoryStore {
    /// Create a new category.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn create(&self, new_category: NewCategory) -> Result<Category, Error>;

    /// Retrieve the category `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a category owned by
    ///   `owner`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID, owner: &UserId) -> Result<Category, Error>;

    /// Retrieve all of the owner's categories.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn get_all(&self, owner: &UserId) -> Result<Vec<Category>, Error>;

    /// Replace the editable fields of the category `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a category owned by
    ///   `owner`,
    /// - [Error::OwnerMismatch] if the owner on `update` is not `owner`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&self, id: DatabaseID, update: NewCategory, owner: &UserId)
    -> Result<Category, Error>;

    /// Delete the category `id`.
    ///
    /// Transactions that referenced the category keep their category ID,
    /// callers should treat dangling category IDs as uncategorised.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a category owned by
    ///   `owner`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&self, id: DatabaseID, owner: &UserId) -> Result<(), Error>;
}

//! Defines the account store trait.

use crate::{
    Error,
    models::{Account, AccountUpdate, DatabaseID, NewAccount, UserId},
};

/// Handles the creation and retrieval of accounts.
pub trait AccountStore {
    /// Create a new account with the given opening balance.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn create(&self, new_account: NewAccount) -> Result<Account, Error>;

    /// Retrieve the account `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to an account owned by
    ///   `owner`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID, owner: &UserId) -> Result<Account, Error>;

    /// Retrieve all of the owner's accounts.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn get_all(&self, owner: &UserId) -> Result<Vec<Account>, Error>;

    /// Change the name and kind of the account `id`. The balance cannot be
    /// edited directly.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to an account owned by
    ///   `owner`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&self, id: DatabaseID, update: AccountUpdate, owner: &UserId)
    -> Result<Account, Error>;

    /// Delete the account `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to an account owned by
    ///   `owner`,
    /// - [Error::AccountInUse] if any transaction still references the
    ///   account,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&self, id: DatabaseID, owner: &UserId) -> Result<(), Error>;

    /// Sum the balances of all the owner's accounts.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn total_balance(&self, owner: &UserId) -> Result<f64, Error>;
}

//! Defines the transaction store trait and its query types.

use time::Date;

use crate::{
    Error,
    models::{DatabaseID, NewTransaction, Transaction, TransactionStatus, TransactionType, UserId},
    range::{DateRange, TimeRange},
};

/// How many transactions [TransactionStore::recent] returns when no limit
/// is given.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Handles the creation, retrieval and aggregation of transactions.
///
/// Implementations must keep account balances consistent: every mutation
/// applies the transaction's signed amount to the referenced account, and
/// the row write and balance write succeed or fail together.
pub trait TransactionStore {
    /// Create a new transaction and apply its amount to the referenced
    /// account balance.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] if the amount is zero or negative,
    /// - [Error::InvalidCategory] if the category does not exist or belongs
    ///   to another user,
    /// - [Error::NotFound] if the account does not exist or belongs to
    ///   another user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&self, new_transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Replace the transaction `id` with `update`, reversing the old
    /// balance effect and applying the new one.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a transaction owned by
    ///   `owner`,
    /// - [Error::OwnerMismatch] if the owner on `update` is not `owner`,
    /// - or any error [TransactionStore::create] can return for the new
    ///   values.
    fn update(
        &self,
        id: DatabaseID,
        update: NewTransaction,
        owner: &UserId,
    ) -> Result<Transaction, Error>;

    /// Delete the transaction `id`, reversing its balance effect.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a transaction owned by
    ///   `owner`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&self, id: DatabaseID, owner: &UserId) -> Result<(), Error>;

    /// Retrieve the transaction `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a transaction owned by
    ///   `owner`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: DatabaseID, owner: &UserId) -> Result<Transaction, Error>;

    /// Retrieve the transactions matching `filter`, most recent first.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn query(&self, owner: &UserId, filter: &TransactionFilter)
    -> Result<Vec<Transaction>, Error>;

    /// Retrieve the most recent transactions within `range`, most recent
    /// first. `limit` defaults to [DEFAULT_RECENT_LIMIT].
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn recent(
        &self,
        owner: &UserId,
        range: TimeRange,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>, Error>;

    /// Sum the income and expense amounts dated within the inclusive range.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn period_totals(&self, owner: &UserId, start: Date, end: Date)
    -> Result<PeriodTotals, Error>;

    /// Sum the signed amounts dated within the inclusive range.
    ///
    /// This is the net effect the period's transactions had on account
    /// balances, used to reconstruct historical totals on the dashboard.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error.
    fn net_change(&self, owner: &UserId, start: Date, end: Date) -> Result<f64, Error>;
}

/// The income and expense totals for a period, both as unsigned magnitudes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodTotals {
    /// The sum of income amounts.
    pub income: f64,
    /// The sum of expense amounts.
    pub expenses: f64,
}

/// Defines which transactions [TransactionStore::query] returns.
///
/// All criteria are optional and combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Match transactions whose description or notes contain this text,
    /// case-insensitively.
    pub search: Option<String>,
    /// Match transactions in this category.
    pub category_id: Option<DatabaseID>,
    /// Match transactions of this type.
    pub kind: Option<TransactionType>,
    /// Match transactions dated within this range.
    pub date_range: Option<DateRange>,
    /// Match transactions with an amount of at least this much.
    pub min_amount: Option<f64>,
    /// Match transactions with an amount of at most this much.
    pub max_amount: Option<f64>,
    /// Match transactions with this status.
    pub status: Option<TransactionStatus>,
}

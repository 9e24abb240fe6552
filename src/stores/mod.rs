//! Defines the storage traits and their SQLite implementations.
//!
//! Consumers construct the SQLite stores (or any other implementation of
//! these traits) and pass them to the import pipeline and dashboard by
//! reference, so storage backends can be swapped in tests.

pub mod sqlite;

mod account;
mod category;
mod import;
mod transaction;
mod user;

pub use account::AccountStore;
pub use category::CategoryStore;
pub use import::ImportStore;
pub use sqlite::{
    SqliteAccountStore, SqliteCategoryStore, SqliteImportStore, SqliteTransactionStore,
    SqliteUserStore,
};
pub use transaction::{PeriodTotals, TransactionFilter, TransactionStore};
pub use user::UserStore;

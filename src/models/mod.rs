//! Defines the data records stored and queried by the library.

mod account;
mod category;
mod import;
mod transaction;
mod user;

pub use account::{Account, AccountType, AccountUpdate, NewAccount};
pub use category::{Category, CategoryType, NewCategory};
pub use import::{
    Import, ImportKind, ImportMetadata, ImportResult, ImportStatus, ImportUpdate, NewImport,
};
pub use transaction::{NewTransaction, Transaction, TransactionStatus, TransactionType};
pub use user::{NewUserProfile, UserId, UserProfile};

/// Alias for the integer type used for database row IDs.
pub type DatabaseID = i64;

//! Implements the storage traits on a shared SQLite connection.
//!
//! All stores hold an `Arc<Mutex<Connection>>` so they can be cloned
//! cheaply and share one database handle. Multi-statement operations use
//! SQLite transactions on that handle.

mod account;
mod category;
mod import;
mod transaction;
mod user;

pub use account::SqliteAccountStore;
pub use category::SqliteCategoryStore;
pub use import::SqliteImportStore;
pub use transaction::SqliteTransactionStore;
pub use user::SqliteUserStore;

//! Implements a SQLite backed account store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    models::{Account, AccountUpdate, DatabaseID, NewAccount, UserId},
    stores::AccountStore,
};

const COLUMNS: &str = "id, name, type, balance, user_id";

/// Stores accounts in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteAccountStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteAccountStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn map_row(row: &Row) -> Result<Account, rusqlite::Error> {
        Ok(Account {
            id: row.get(0)?,
            name: row.get(1)?,
            kind: row.get(2)?,
            balance: row.get(3)?,
            owner: row.get(4)?,
        })
    }
}

impl AccountStore for SqliteAccountStore {
    fn create(&self, new_account: NewAccount) -> Result<Account, Error> {
        let account = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO accounts (name, type, balance, user_id)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    new_account.name,
                    new_account.kind,
                    new_account.balance,
                    new_account.owner,
                ],
                Self::map_row,
            )?;

        Ok(account)
    }

    fn get(&self, id: DatabaseID, owner: &UserId) -> Result<Account, Error> {
        let account = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM accounts WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row(params![id, owner], Self::map_row)?;

        Ok(account)
    }

    fn get_all(&self, owner: &UserId) -> Result<Vec<Account>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM accounts WHERE user_id = ?1 ORDER BY id"
            ))?
            .query_map(params![owner], Self::map_row)?
            .map(|maybe_account| maybe_account.map_err(Error::SqlError))
            .collect()
    }

    fn update(
        &self,
        id: DatabaseID,
        update: AccountUpdate,
        owner: &UserId,
    ) -> Result<Account, Error> {
        let account = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "UPDATE accounts SET name = ?1, type = ?2
                 WHERE id = ?3 AND user_id = ?4
                 RETURNING {COLUMNS}"
            ))?
            .query_row(params![update.name, update.kind, id, owner], Self::map_row)?;

        Ok(account)
    }

    fn delete(&self, id: DatabaseID, owner: &UserId) -> Result<(), Error> {
        let connection = self.connection.lock().unwrap();
        let tx = connection.unchecked_transaction()?;

        let exists: i64 = tx.query_row(
            "SELECT COUNT(id) FROM accounts WHERE id = ?1 AND user_id = ?2",
            params![id, owner],
            |row| row.get(0),
        )?;

        if exists == 0 {
            return Err(Error::NotFound);
        }

        let references: i64 = tx.query_row(
            "SELECT COUNT(id) FROM transactions WHERE account_id = ?1 AND user_id = ?2",
            params![id, owner],
            |row| row.get(0),
        )?;

        if references > 0 {
            return Err(Error::AccountInUse);
        }

        tx.execute(
            "DELETE FROM accounts WHERE id = ?1 AND user_id = ?2",
            params![id, owner],
        )?;

        tx.commit()?;

        Ok(())
    }

    fn total_balance(&self, owner: &UserId) -> Result<f64, Error> {
        let total = self.connection.lock().unwrap().query_row(
            "SELECT COALESCE(SUM(balance), 0) FROM accounts WHERE user_id = ?1",
            params![owner],
            |row| row.get(0),
        )?;

        Ok(total)
    }
}

//! Implements a SQLite backed transaction store with balance side effects.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params, params_from_iter, types::Value};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    models::{DatabaseID, NewTransaction, Transaction, UserId},
    range::TimeRange,
    stores::{
        PeriodTotals, TransactionFilter, TransactionStore, transaction::DEFAULT_RECENT_LIMIT,
    },
};

const COLUMNS: &str =
    "id, description, amount, date, type, category_id, account_id, notes, receipt_url, status, \
     user_id";

/// Stores transactions in a SQLite database and keeps account balances in
/// step with them.
///
/// Every mutation runs inside a SQLite transaction that covers both the
/// row write and the balance write, so a failure in either leaves the
/// database unchanged. Balance writes are relative
/// (`balance = balance + delta`) so they compose under concurrent use.
#[derive(Debug, Clone)]
pub struct SqliteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn map_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
        Ok(Transaction {
            id: row.get(0)?,
            description: row.get(1)?,
            amount: row.get(2)?,
            date: row.get(3)?,
            kind: row.get(4)?,
            category_id: row.get(5)?,
            account_id: row.get(6)?,
            notes: row.get(7)?,
            receipt_url: row.get(8)?,
            status: row.get(9)?,
            owner: row.get(10)?,
        })
    }
}

/// Check that the category exists and belongs to `owner`.
fn verify_category(
    connection: &Connection,
    category_id: DatabaseID,
    owner: &UserId,
) -> Result<(), Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM categories WHERE id = ?1 AND user_id = ?2",
        params![category_id, owner],
        |row| row.get(0),
    )?;

    if count == 0 {
        return Err(Error::InvalidCategory);
    }

    Ok(())
}

/// Check that the account exists and belongs to `owner`.
fn verify_account(
    connection: &Connection,
    account_id: DatabaseID,
    owner: &UserId,
) -> Result<(), Error> {
    let count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM accounts WHERE id = ?1 AND user_id = ?2",
        params![account_id, owner],
        |row| row.get(0),
    )?;

    if count == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Add `delta` to the account's balance.
fn apply_balance_delta(
    connection: &Connection,
    account_id: DatabaseID,
    delta: f64,
) -> Result<(), Error> {
    connection.execute(
        "UPDATE accounts SET balance = balance + ?1 WHERE id = ?2",
        params![delta, account_id],
    )?;

    Ok(())
}

impl TransactionStore for SqliteTransactionStore {
    fn create(&self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        if new_transaction.amount <= 0.0 {
            return Err(Error::InvalidAmount(new_transaction.amount));
        }

        let connection = self.connection.lock().unwrap();
        let tx = connection.unchecked_transaction()?;

        verify_category(&tx, new_transaction.category_id, &new_transaction.owner)?;

        if let Some(account_id) = new_transaction.account_id {
            verify_account(&tx, account_id, &new_transaction.owner)?;
        }

        let transaction = tx
            .prepare(&format!(
                "INSERT INTO transactions (description, amount, date, type, category_id, \
                 account_id, notes, receipt_url, status, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    new_transaction.description,
                    new_transaction.amount,
                    new_transaction.date,
                    new_transaction.kind,
                    new_transaction.category_id,
                    new_transaction.account_id,
                    new_transaction.notes,
                    new_transaction.receipt_url,
                    new_transaction.status,
                    new_transaction.owner,
                ],
                Self::map_row,
            )?;

        if let Some(account_id) = transaction.account_id {
            apply_balance_delta(&tx, account_id, transaction.signed_amount())?;
        }

        tx.commit()?;

        Ok(transaction)
    }

    fn update(
        &self,
        id: DatabaseID,
        update: NewTransaction,
        owner: &UserId,
    ) -> Result<Transaction, Error> {
        if &update.owner != owner {
            return Err(Error::OwnerMismatch);
        }

        if update.amount <= 0.0 {
            return Err(Error::InvalidAmount(update.amount));
        }

        let connection = self.connection.lock().unwrap();
        let tx = connection.unchecked_transaction()?;

        let existing = tx
            .prepare(&format!(
                "SELECT {COLUMNS} FROM transactions WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row(params![id, owner], Self::map_row)?;

        // Reverse the old balance effect before applying the new one, so
        // that amount, type and account can all change independently.
        if let Some(account_id) = existing.account_id {
            apply_balance_delta(&tx, account_id, -existing.signed_amount())?;
        }

        verify_category(&tx, update.category_id, owner)?;

        if let Some(account_id) = update.account_id {
            verify_account(&tx, account_id, owner)?;
            apply_balance_delta(&tx, account_id, update.signed_amount())?;
        }

        let transaction = tx
            .prepare(&format!(
                "UPDATE transactions
                 SET description = ?1, amount = ?2, date = ?3, type = ?4, category_id = ?5, \
                 account_id = ?6, notes = ?7, receipt_url = ?8, status = ?9
                 WHERE id = ?10 AND user_id = ?11
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    update.description,
                    update.amount,
                    update.date,
                    update.kind,
                    update.category_id,
                    update.account_id,
                    update.notes,
                    update.receipt_url,
                    update.status,
                    id,
                    owner,
                ],
                Self::map_row,
            )?;

        tx.commit()?;

        Ok(transaction)
    }

    fn delete(&self, id: DatabaseID, owner: &UserId) -> Result<(), Error> {
        let connection = self.connection.lock().unwrap();
        let tx = connection.unchecked_transaction()?;

        let existing = tx
            .prepare(&format!(
                "SELECT {COLUMNS} FROM transactions WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row(params![id, owner], Self::map_row)?;

        if let Some(account_id) = existing.account_id {
            apply_balance_delta(&tx, account_id, -existing.signed_amount())?;
        }

        tx.execute(
            "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
            params![id, owner],
        )?;

        tx.commit()?;

        Ok(())
    }

    fn get(&self, id: DatabaseID, owner: &UserId) -> Result<Transaction, Error> {
        let transaction = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM transactions WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row(params![id, owner], Self::map_row)?;

        Ok(transaction)
    }

    fn query(
        &self,
        owner: &UserId,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, Error> {
        let mut query_string_parts = vec![format!("SELECT {COLUMNS} FROM transactions")];
        let mut where_clause_parts = vec!["user_id = ?1".to_string()];
        let mut query_parameters = vec![Value::Text(owner.as_str().to_owned())];

        if let Some(search) = &filter.search {
            where_clause_parts.push(format!(
                "(LOWER(description) LIKE ?{index} OR LOWER(COALESCE(notes, '')) LIKE ?{index})",
                index = query_parameters.len() + 1,
            ));
            query_parameters.push(Value::Text(format!("%{}%", search.to_lowercase())));
        }

        if let Some(category_id) = filter.category_id {
            where_clause_parts.push(format!("category_id = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Integer(category_id));
        }

        if let Some(kind) = filter.kind {
            where_clause_parts.push(format!("type = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(kind.as_str().to_owned()));
        }

        if let Some(date_range) = filter.date_range {
            let (start, end) = date_range.resolve(OffsetDateTime::now_utc().date());
            where_clause_parts.push(format!(
                "date BETWEEN ?{} AND ?{}",
                query_parameters.len() + 1,
                query_parameters.len() + 2,
            ));
            query_parameters.push(Value::Text(start.to_string()));
            query_parameters.push(Value::Text(end.to_string()));
        }

        if let Some(min_amount) = filter.min_amount {
            where_clause_parts.push(format!("amount >= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Real(min_amount));
        }

        if let Some(max_amount) = filter.max_amount {
            where_clause_parts.push(format!("amount <= ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Real(max_amount));
        }

        if let Some(status) = filter.status {
            where_clause_parts.push(format!("status = ?{}", query_parameters.len() + 1));
            query_parameters.push(Value::Text(status.as_str().to_owned()));
        }

        query_string_parts.push(String::from("WHERE ") + &where_clause_parts.join(" AND "));
        query_string_parts.push("ORDER BY date DESC, id DESC".to_string());

        let query_string = query_string_parts.join(" ");
        let params = params_from_iter(query_parameters.iter());

        self.connection
            .lock()
            .unwrap()
            .prepare(&query_string)?
            .query_map(params, Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    fn recent(
        &self,
        owner: &UserId,
        range: TimeRange,
        limit: Option<usize>,
    ) -> Result<Vec<Transaction>, Error> {
        let (start, end) = range.window(OffsetDateTime::now_utc().date());
        // SQLite binds integers as i64, so the limit is converted up front.
        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT) as i64;

        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM transactions
                 WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
                 ORDER BY date DESC, id DESC
                 LIMIT ?4"
            ))?
            .query_map(params![owner, start, end, limit], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    fn period_totals(
        &self,
        owner: &UserId,
        start: Date,
        end: Date,
    ) -> Result<PeriodTotals, Error> {
        let totals = self.connection.lock().unwrap().query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount ELSE 0 END), 0)
             FROM transactions
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3",
            params![owner, start, end],
            |row| {
                Ok(PeriodTotals {
                    income: row.get(0)?,
                    expenses: row.get(1)?,
                })
            },
        )?;

        Ok(totals)
    }

    fn net_change(&self, owner: &UserId, start: Date, end: Date) -> Result<f64, Error> {
        let net = self.connection.lock().unwrap().query_row(
            "SELECT COALESCE(SUM(CASE WHEN type = 'income' THEN amount ELSE -amount END), 0)
             FROM transactions
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3",
            params![owner, start, end],
            |row| row.get(0),
        )?;

        Ok(net)
    }
}

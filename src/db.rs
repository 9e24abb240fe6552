//! Defines the database schema and its initialisation.
//!
//! Dates are stored as ISO-8601 text so that lexicographic ordering in SQL
//! matches chronological ordering. Ownership is not enforced with foreign
//! keys, every query is scoped by the `user_id` column instead.

use rusqlite::Connection;

use crate::Error;

/// Create the application tables if they do not already exist.
///
/// # Errors
/// Returns an [Error::SqlError] if the schema could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let tx = connection.unchecked_transaction()?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            display_name TEXT,
            email TEXT
        )",
        (),
    )?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            icon TEXT,
            color TEXT,
            type TEXT NOT NULL,
            user_id TEXT NOT NULL
        )",
        (),
    )?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            balance REAL NOT NULL DEFAULT 0,
            user_id TEXT NOT NULL
        )",
        (),
    )?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            type TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            account_id INTEGER,
            notes TEXT,
            receipt_url TEXT,
            status TEXT NOT NULL DEFAULT 'completed',
            user_id TEXT NOT NULL
        )",
        (),
    )?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS imports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            filename TEXT NOT NULL,
            filesize INTEGER,
            type TEXT NOT NULL,
            date_imported TEXT NOT NULL,
            transaction_count INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'processing',
            user_id TEXT NOT NULL,
            metadata TEXT
        )",
        (),
    )?;

    tx.commit()?;

    Ok(())
}

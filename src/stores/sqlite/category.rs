//! Implements a SQLite backed category store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    models::{Category, DatabaseID, NewCategory, UserId},
    stores::CategoryStore,
};

const COLUMNS: &str = "id, name, icon, color, type, user_id";

/// Stores categories in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteCategoryStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            icon: row.get(2)?,
            color: row.get(3)?,
            kind: row.get(4)?,
            owner: row.get(5)?,
        })
    }
}

impl CategoryStore for SqliteCategoryStore {
    fn create(&self, new_category: NewCategory) -> Result<Category, Error> {
        let category = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO categories (name, icon, color, type, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    new_category.name,
                    new_category.icon,
                    new_category.color,
                    new_category.kind,
                    new_category.owner,
                ],
                Self::map_row,
            )?;

        Ok(category)
    }

    fn get(&self, id: DatabaseID, owner: &UserId) -> Result<Category, Error> {
        let category = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM categories WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row(params![id, owner], Self::map_row)?;

        Ok(category)
    }

    fn get_all(&self, owner: &UserId) -> Result<Vec<Category>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM categories WHERE user_id = ?1 ORDER BY id"
            ))?
            .query_map(params![owner], Self::map_row)?
            .map(|maybe_category| maybe_category.map_err(Error::SqlError))
            .collect()
    }

    fn update(
        &self,
        id: DatabaseID,
        update: NewCategory,
        owner: &UserId,
    ) -> Result<Category, Error> {
        if &update.owner != owner {
            return Err(Error::OwnerMismatch);
        }

        let category = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "UPDATE categories SET name = ?1, icon = ?2, color = ?3, type = ?4
                 WHERE id = ?5 AND user_id = ?6
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![update.name, update.icon, update.color, update.kind, id, owner],
                Self::map_row,
            )?;

        Ok(category)
    }

    fn delete(&self, id: DatabaseID, owner: &UserId) -> Result<(), Error> {
        let deleted = self.connection.lock().unwrap().execute(
            "DELETE FROM categories WHERE id = ?1 AND user_id = ?2",
            params![id, owner],
        )?;

        if deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

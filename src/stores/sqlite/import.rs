//! Implements a SQLite backed import record store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params};
use time::OffsetDateTime;

use crate::{
    Error,
    models::{DatabaseID, Import, ImportMetadata, ImportStatus, ImportUpdate, NewImport, UserId},
    stores::ImportStore,
};

const COLUMNS: &str =
    "id, filename, filesize, type, date_imported, transaction_count, status, user_id, metadata";

/// Stores import records in a SQLite database.
///
/// Metadata is serialized as JSON into a TEXT column.
#[derive(Debug, Clone)]
pub struct SqliteImportStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteImportStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn map_row(row: &Row) -> Result<Import, rusqlite::Error> {
        let metadata: Option<String> = row.get(8)?;
        let metadata = match metadata {
            Some(text) => serde_json::from_str(&text).map_err(|error| {
                rusqlite::Error::FromSqlConversionFailure(
                    8,
                    rusqlite::types::Type::Text,
                    Box::new(error),
                )
            })?,
            None => ImportMetadata::default(),
        };

        Ok(Import {
            id: row.get(0)?,
            filename: row.get(1)?,
            filesize: row.get(2)?,
            kind: row.get(3)?,
            date_imported: row.get(4)?,
            transaction_count: row.get(5)?,
            status: row.get(6)?,
            owner: row.get(7)?,
            metadata,
        })
    }
}

impl ImportStore for SqliteImportStore {
    fn create(&self, new_import: NewImport) -> Result<Import, Error> {
        let metadata = serde_json::to_string(&new_import.metadata)?;

        let import = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO imports (filename, filesize, type, date_imported, \
                 transaction_count, status, user_id, metadata)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![
                    new_import.filename,
                    new_import.filesize,
                    new_import.kind,
                    OffsetDateTime::now_utc(),
                    ImportStatus::Processing,
                    new_import.owner,
                    metadata,
                ],
                Self::map_row,
            )?;

        Ok(import)
    }

    fn get(&self, id: DatabaseID, owner: &UserId) -> Result<Import, Error> {
        let import = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM imports WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row(params![id, owner], Self::map_row)?;

        Ok(import)
    }

    fn get_all(&self, owner: &UserId) -> Result<Vec<Import>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "SELECT {COLUMNS} FROM imports WHERE user_id = ?1
                 ORDER BY date_imported DESC, id DESC"
            ))?
            .query_map(params![owner], Self::map_row)?
            .map(|maybe_import| maybe_import.map_err(Error::SqlError))
            .collect()
    }

    fn update(
        &self,
        id: DatabaseID,
        update: ImportUpdate,
        owner: &UserId,
    ) -> Result<Import, Error> {
        let connection = self.connection.lock().unwrap();
        let tx = connection.unchecked_transaction()?;

        let existing = tx
            .prepare(&format!(
                "SELECT {COLUMNS} FROM imports WHERE id = ?1 AND user_id = ?2"
            ))?
            .query_row(params![id, owner], Self::map_row)?;

        // Terminal statuses are final, so an import is finalised at most
        // once even if the pipeline retries its bookkeeping.
        if let Some(status) = update.status
            && existing.status.is_terminal()
            && status != existing.status
        {
            return Err(Error::ImportFinalised);
        }

        let status = update.status.unwrap_or(existing.status);
        let transaction_count = update.transaction_count.unwrap_or(existing.transaction_count);
        let metadata = update.metadata.unwrap_or(existing.metadata);
        let metadata_json = serde_json::to_string(&metadata)?;

        let import = tx
            .prepare(&format!(
                "UPDATE imports SET status = ?1, transaction_count = ?2, metadata = ?3
                 WHERE id = ?4 AND user_id = ?5
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![status, transaction_count, metadata_json, id, owner],
                Self::map_row,
            )?;

        tx.commit()?;

        Ok(import)
    }

    fn delete(&self, id: DatabaseID, owner: &UserId) -> Result<(), Error> {
        let deleted = self.connection.lock().unwrap().execute(
            "DELETE FROM imports WHERE id = ?1 AND user_id = ?2",
            params![id, owner],
        )?;

        if deleted == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod sqlite_import_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        models::{ImportKind, ImportMetadata, ImportStatus, ImportUpdate, NewImport, UserId},
        stores::ImportStore,
    };

    use super::SqliteImportStore;

    fn get_store() -> (SqliteImportStore, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        (
            SqliteImportStore::new(Arc::new(Mutex::new(connection))),
            UserId::new("user-1"),
        )
    }

    fn new_import(owner: &UserId) -> NewImport {
        NewImport {
            filename: "statement.csv".to_owned(),
            filesize: Some(2048),
            kind: ImportKind::BankStatement,
            owner: owner.clone(),
            metadata: ImportMetadata {
                institution: Some("chase".to_owned()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn create_starts_in_processing() {
        let (store, owner) = get_store();

        let import = store.create(new_import(&owner)).unwrap();

        assert_eq!(import.status, ImportStatus::Processing);
        assert_eq!(import.transaction_count, 0);
        assert_eq!(import.metadata.institution.as_deref(), Some("chase"));
    }

    #[test]
    fn get_does_not_return_other_users_imports() {
        let (store, owner) = get_store();
        let import = store.create(new_import(&owner)).unwrap();

        assert_eq!(
            store.get(import.id, &UserId::new("user-2")),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn get_all_returns_most_recent_first() {
        let (store, owner) = get_store();
        let first = store.create(new_import(&owner)).unwrap();
        let second = store.create(new_import(&owner)).unwrap();

        let imports = store.get_all(&owner).unwrap();

        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].id, second.id);
        assert_eq!(imports[1].id, first.id);
    }

    #[test]
    fn update_merges_unset_fields() {
        let (store, owner) = get_store();
        let import = store.create(new_import(&owner)).unwrap();

        let updated = store
            .update(
                import.id,
                ImportUpdate {
                    transaction_count: Some(7),
                    ..Default::default()
                },
                &owner,
            )
            .unwrap();

        assert_eq!(updated.transaction_count, 7);
        assert_eq!(updated.status, ImportStatus::Processing);
        assert_eq!(updated.metadata.institution.as_deref(), Some("chase"));
    }

    #[test]
    fn update_finalises_with_outcome_metadata() {
        let (store, owner) = get_store();
        let import = store.create(new_import(&owner)).unwrap();

        let updated = store
            .update(
                import.id,
                ImportUpdate {
                    status: Some(ImportStatus::CompletedWithErrors),
                    transaction_count: Some(2),
                    metadata: Some(ImportMetadata {
                        institution: Some("chase".to_owned()),
                        transaction_ids: vec![10, 11],
                        errors: vec!["Error processing transaction 'Coffee': bad date".to_owned()],
                        duplicates_skipped: Some(1),
                        error: None,
                    }),
                },
                &owner,
            )
            .unwrap();

        assert_eq!(updated.status, ImportStatus::CompletedWithErrors);
        assert_eq!(updated.metadata.transaction_ids, vec![10, 11]);
        assert_eq!(updated.metadata.duplicates_skipped, Some(1));
    }

    #[test]
    fn update_rejects_status_change_after_finalisation() {
        let (store, owner) = get_store();
        let import = store.create(new_import(&owner)).unwrap();

        store
            .update(
                import.id,
                ImportUpdate {
                    status: Some(ImportStatus::Completed),
                    ..Default::default()
                },
                &owner,
            )
            .unwrap();

        let result = store.update(
            import.id,
            ImportUpdate {
                status: Some(ImportStatus::Failed),
                ..Default::default()
            },
            &owner,
        );

        assert_eq!(result, Err(Error::ImportFinalised));
    }

    #[test]
    fn update_fails_on_missing_import() {
        let (store, owner) = get_store();

        let result = store.update(999, ImportUpdate::default(), &owner);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_record() {
        let (store, owner) = get_store();
        let import = store.create(new_import(&owner)).unwrap();

        store.delete(import.id, &owner).unwrap();

        assert_eq!(store.get(import.id, &owner), Err(Error::NotFound));
    }
}

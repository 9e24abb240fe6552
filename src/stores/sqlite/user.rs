//! Implements a SQLite backed user profile store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row, params};

use crate::{
    Error,
    models::{NewUserProfile, UserId, UserProfile},
    stores::UserStore,
};

const COLUMNS: &str = "id, uid, display_name, email";

/// Stores user profiles in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn map_row(row: &Row) -> Result<UserProfile, rusqlite::Error> {
        Ok(UserProfile {
            id: row.get(0)?,
            uid: row.get(1)?,
            display_name: row.get(2)?,
            email: row.get(3)?,
        })
    }
}

impl UserStore for SqliteUserStore {
    fn create(&self, new_profile: NewUserProfile) -> Result<UserProfile, Error> {
        let profile = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!(
                "INSERT INTO users (uid, display_name, email)
                 VALUES (?1, ?2, ?3)
                 RETURNING {COLUMNS}"
            ))?
            .query_row(
                params![new_profile.uid, new_profile.display_name, new_profile.email],
                Self::map_row,
            )?;

        Ok(profile)
    }

    fn get_by_uid(&self, uid: &UserId) -> Result<UserProfile, Error> {
        let profile = self
            .connection
            .lock()
            .unwrap()
            .prepare(&format!("SELECT {COLUMNS} FROM users WHERE uid = ?1"))?
            .query_row(params![uid], Self::map_row)?;

        Ok(profile)
    }
}

#[cfg(test)]
mod sqlite_user_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        models::{NewUserProfile, UserId},
        stores::UserStore,
    };

    use super::SqliteUserStore;

    fn get_store() -> SqliteUserStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        SqliteUserStore::new(Arc::new(Mutex::new(connection)))
    }

    #[test]
    fn create_and_get_by_uid_round_trip() {
        let store = get_store();

        let created = store
            .create(NewUserProfile {
                uid: UserId::new("auth0|abc123"),
                display_name: Some("Alex".to_owned()),
                email: Some("alex@example.com".to_owned()),
            })
            .unwrap();

        let fetched = store.get_by_uid(&UserId::new("auth0|abc123")).unwrap();

        assert_eq!(fetched, created);
    }

    #[test]
    fn get_by_uid_fails_for_unknown_user() {
        let store = get_store();

        assert_eq!(
            store.get_by_uid(&UserId::new("auth0|missing")),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn create_fails_on_duplicate_uid() {
        let store = get_store();
        let profile = NewUserProfile {
            uid: UserId::new("auth0|abc123"),
            display_name: None,
            email: None,
        };

        store.create(profile.clone()).unwrap();

        assert!(store.create(profile).is_err());
    }
}

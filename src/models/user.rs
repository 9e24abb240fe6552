//! Defines the user ID newtype and the user profile record.

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::DatabaseID;

/// An opaque identifier for a user, issued by the authentication provider.
///
/// The library never interprets the contents, it only scopes queries by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identifier issued by the authentication provider.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for UserId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.0.as_str().into())
    }
}

impl FromSql for UserId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(UserId::new)
    }
}

/// Profile details for a user.
///
/// Credentials are handled by the external authentication provider, only
/// the profile fields the tracker displays are stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The database ID of the profile row.
    pub id: DatabaseID,
    /// The identifier issued by the authentication provider.
    pub uid: UserId,
    /// The name shown in the UI.
    pub display_name: Option<String>,
    /// The user's email address.
    pub email: Option<String>,
}

/// The data required to create a user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUserProfile {
    /// The identifier issued by the authentication provider.
    pub uid: UserId,
    /// The name shown in the UI.
    pub display_name: Option<String>,
    /// The user's email address.
    pub email: Option<String>,
}

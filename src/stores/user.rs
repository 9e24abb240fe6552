//! Defines the user profile store trait.

use crate::{
    Error,
    models::{NewUserProfile, UserId, UserProfile},
};

/// Handles the creation and retrieval of user profiles.
///
/// Authentication happens outside the library, this store only keeps the
/// profile fields the tracker displays.
pub trait UserStore {
    /// Create a new user profile.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is a SQL
    /// error, including when the uid already exists.
    fn create(&self, new_profile: NewUserProfile) -> Result<UserProfile, Error>;

    /// Retrieve the profile for the authentication provider ID `uid`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if no profile exists for `uid`,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_by_uid(&self, uid: &UserId) -> Result<UserProfile, Error>;
}

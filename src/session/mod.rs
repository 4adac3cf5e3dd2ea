//! Session
//!
//! Simulated sign-in. Any well-formed email with a non-empty password is
//! accepted and the same mock user is issued; the signed-in user is kept under
//! the `user` and `token` keys.

use std::sync::Arc;

use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    ids::UserId,
    storage::{KeyValueStore, StorageError},
};

/// Storage key for the signed-in user.
pub const USER_KEY: &str = "user";

/// Storage key for the session token.
pub const TOKEN_KEY: &str = "token";

const MOCK_USER_ID: &str = "1";
const MOCK_USER_NAME: &str = "Test User";
const MOCK_TOKEN: &str = "mock-jwt-token";

/// Errors raised by sign-in operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The email or password was not acceptable.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The user record could not be encoded.
    #[error("failed to encode user")]
    Encode(#[from] serde_json::Error),

    /// The session could not be persisted.
    #[error("failed to persist session")]
    Storage(#[from] StorageError),
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Learner
    Student,

    /// Course author
    Instructor,

    /// Catalog administrator
    Admin,
}

/// A signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Account role
    pub role: Role,
}

/// Who is using the storefront.
#[automock]
pub trait Identity {
    /// Whether someone is signed in.
    fn is_authenticated(&self) -> bool;

    /// Id of the signed-in user.
    fn current_user_id(&self) -> Option<UserId>;
}

/// The current sign-in state, persisted to `storage`.
#[derive(Debug)]
pub struct Session {
    storage: Arc<dyn KeyValueStore>,
    user: Option<User>,
}

impl Session {
    /// Restore the stored session. A user value that fails to parse is
    /// discarded and the session starts signed out.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be read.
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let user = match storage.get(USER_KEY)? {
            None => None,
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(user) => Some(user),
                Err(error) => {
                    warn!(%error, "discarding corrupt stored user");
                    storage.remove(USER_KEY)?;
                    None
                }
            },
        };

        Ok(Self { storage, user })
    }

    /// The signed-in user.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The stored session token.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend could not be read.
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.storage.get(TOKEN_KEY)
    }

    /// Sign in as the mock user.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidCredentials`] for a malformed email or an
    /// empty password, or a storage error if the session could not be saved.
    pub fn login(&mut self, email: &str, password: &str) -> Result<&User, SessionError> {
        self.sign_in(MOCK_USER_NAME, email, password)
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Same as [`Session::login`]; an empty name is also rejected.
    pub fn register(&mut self, name: &str, email: &str, password: &str) -> Result<&User, SessionError> {
        if name.trim().is_empty() {
            return Err(SessionError::InvalidCredentials);
        }

        self.sign_in(name, email, password)
    }

    /// Sign out, removing the stored user and token.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the keys could not be removed.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.storage.remove(USER_KEY)?;
        self.storage.remove(TOKEN_KEY)?;

        if let Some(user) = self.user.take() {
            info!(user_id = %user.id, "signed out");
        }

        Ok(())
    }

    fn sign_in(&mut self, name: &str, email: &str, password: &str) -> Result<&User, SessionError> {
        if !email.contains('@') || password.is_empty() {
            return Err(SessionError::InvalidCredentials);
        }

        let user = User {
            id: UserId::from(MOCK_USER_ID),
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Student,
        };

        self.storage.set(USER_KEY, &serde_json::to_string(&user)?)?;
        self.storage.set(TOKEN_KEY, MOCK_TOKEN)?;

        info!(user_id = %user.id, email = %user.email, "signed in");

        Ok(&*self.user.insert(user))
    }
}

impl Identity for Session {
    fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn current_user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|user| user.id.clone())
    }
}

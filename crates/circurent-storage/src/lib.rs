//! Storage abstraction for CircuRent.
//!
//! Backend crates (e.g., circurent-store-memory, or a future SQL backend)
//! implement [`UserStore`] so the server doesn't depend on any specific
//! database engine or schema details.
//!
//! Uniqueness of `email` and `username` is enforced by the backend at
//! `create_user` time. Callers may pre-check availability, but those checks
//! are advisory only — the create call is the authoritative backstop and
//! must reject duplicates even when a pre-check passed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Uniform error type for all storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("username already taken")]
    DuplicateUsername,
    #[error("backend error: {0}")]
    Backend(String),
}

/// Strongly-typed user identifier (avoid mixing raw strings).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

/// Structured postal address attached to a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// User record.
///
/// `username` and `email` are stored normalized (trimmed, lowercase).
/// `password_hash` is an Argon2id PHC string; plaintext never reaches a
/// backend.
#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a user.
#[derive(Clone, Debug)]
pub struct CreateUserParams {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub address: Option<Address>,
}

/// The storage trait the registration core depends on.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Create a new user (returns the generated ID).
    ///
    /// Fails with [`StoreError::DuplicateEmail`] or
    /// [`StoreError::DuplicateUsername`] when the unique constraint is
    /// violated, regardless of any earlier advisory availability check.
    async fn create_user(&self, params: &CreateUserParams) -> Result<UserId, StoreError>;

    /// Get user by normalized email.
    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;

    /// Get user by normalized username.
    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError>;

    /// Get user by ID.
    async fn get_user_by_id(&self, user_id: &UserId) -> Result<User, StoreError>;
}

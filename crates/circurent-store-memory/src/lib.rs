//! In-memory [`UserStore`] backend.
//!
//! This implementation is suitable for:
//! - Single server deployments
//! - Development and testing
//!
//! Records live in a single map guarded by one lock, so the uniqueness
//! check and the insert in `create_user` happen under the same write
//! guard. Two racing registrations for the same email or username resolve
//! to exactly one winner; the loser gets the duplicate error. Nothing is
//! persisted across restarts — swap in a database-backed implementation of
//! the same trait for multi-instance deployments.

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use circurent_storage::{CreateUserParams, StoreError, User, UserId, UserStore};

/// In-memory user store.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, params: &CreateUserParams) -> Result<UserId, StoreError> {
        let mut users = self.users.write();

        // Uniqueness check and insert share the write guard; this is the
        // authoritative backstop behind any advisory availability check.
        if users.values().any(|u| u.email == params.email) {
            return Err(StoreError::DuplicateEmail);
        }
        if users.values().any(|u| u.username == params.username) {
            return Err(StoreError::DuplicateUsername);
        }

        let id = UserId(Uuid::new_v4());
        users.insert(
            id.clone(),
            User {
                id: id.clone(),
                username: params.username.clone(),
                email: params.email.clone(),
                password_hash: params.password_hash.clone(),
                name: params.name.clone(),
                address: params.address.clone(),
                created_at: Utc::now(),
            },
        );

        Ok(id)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, StoreError> {
        self.users
            .read()
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_id(&self, user_id: &UserId) -> Result<User, StoreError> {
        self.users
            .read()
            .get(user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

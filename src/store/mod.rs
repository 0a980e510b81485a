//! Persistence layer
//!
//! All data access goes through the [`Store`] trait so request handlers
//! receive an explicitly constructed store instead of ambient global
//! state, and tests can substitute an isolated in-memory store.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use crate::models::{Entry, NewEntry, NewUser, User};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username is already taken")]
    DuplicateUsername,

    #[error("user not found")]
    UserNotFound,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Document-style persistence contract for users and entries.
///
/// `insert_entry` links the entry to its owner atomically: the entry
/// row and the back-reference are one write, so there is no window in
/// which an entry exists without appearing in its owner's entries.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Lookup by exact username. Callers normalize to lowercase first.
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn count_users(&self) -> Result<i64, StoreError>;

    /// Persist an entry owned by `entry.user_id`. Fails with
    /// [`StoreError::UserNotFound`] if the owner does not exist.
    async fn insert_entry(&self, entry: NewEntry) -> Result<Entry, StoreError>;

    /// All entries owned by a user, in creation order.
    async fn entries_for_user(&self, user_id: Uuid) -> Result<Vec<Entry>, StoreError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}

//! In-memory store for tests
//!
//! Mirrors the Postgres store's semantics: unique usernames, owner
//! validation on entry insert, creation-order listing. Each instance is
//! fully isolated, so tests never share state.

use super::{Store, StoreError};
use crate::models::{Entry, NewEntry, NewUser, User};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    entries: Vec<Entry>,
}

/// Isolated in-memory store.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored entries, for asserting no-write behavior.
    pub async fn entry_count(&self) -> usize {
        self.inner.read().await.entries.len()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::DuplicateUsername);
        }

        let stored = User {
            id: Uuid::new_v4(),
            firstname: user.firstname,
            lastname: user.lastname,
            username: user.username,
            password_hash: user.password_hash,
            gender: user.gender,
            objective: user.objective,
            height_cm: user.height_cm,
            effort: user.effort,
            weights: user.initial_weight.into_iter().collect(),
            created_at: Utc::now(),
        };
        inner.users.push(stored.clone());
        Ok(stored)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.inner.read().await.users.clone())
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        Ok(self.inner.read().await.users.len() as i64)
    }

    async fn insert_entry(&self, entry: NewEntry) -> Result<Entry, StoreError> {
        // Owner check and insert happen under one write lock, matching
        // the atomicity of the SQL foreign key.
        let mut inner = self.inner.write().await;
        if !inner.users.iter().any(|u| u.id == entry.user_id) {
            return Err(StoreError::UserNotFound);
        }

        let stored = Entry {
            id: Uuid::new_v4(),
            description: entry.description,
            date: entry.date,
            time: entry.time,
            calories: entry.calories,
            user_id: entry.user_id,
            created_at: Utc::now(),
        };
        inner.entries.push(stored.clone());
        Ok(stored)
    }

    async fn entries_for_user(&self, user_id: Uuid) -> Result<Vec<Entry>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

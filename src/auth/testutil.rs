//! Test doubles for the auth module

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::models::{NewUser, ProfileChanges, User};
use super::repository::{RepoError, UserRepository};
use crate::common::generate_user_id;

/// In-memory user store that counts calls and can simulate races and outages.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<i64, User>>,
    pub finds: AtomicUsize,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
    /// Next `find_by_telegram_id` misses, as if another login were mid-insert
    pub stale_next_find: AtomicBool,
    pub unavailable: AtomicBool,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, user: User) {
        self.users.lock().unwrap().insert(user.telegram_id, user);
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn writes(&self) -> usize {
        self.creates.load(Ordering::SeqCst) + self.updates.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), RepoError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RepoError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, RepoError> {
        self.check_available()?;
        self.finds.fetch_add(1, Ordering::SeqCst);
        if self.stale_next_find.swap(false, Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.users.lock().unwrap().get(&telegram_id).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepoError> {
        self.check_available()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn create_user(&self, profile: &NewUser) -> Result<User, RepoError> {
        self.check_available()?;
        self.creates.fetch_add(1, Ordering::SeqCst);

        let mut users = self.users.lock().unwrap();
        if users.contains_key(&profile.telegram_id) {
            return Err(RepoError::Conflict);
        }

        let now = Utc::now().to_rfc3339();
        let user = User {
            id: generate_user_id(),
            telegram_id: profile.telegram_id,
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            username: profile.username.clone(),
            avatar_url: profile.avatar_url.clone(),
            created_at: now.clone(),
            updated_at: now,
        };
        users.insert(user.telegram_id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: &str, changes: &ProfileChanges) -> Result<User, RepoError> {
        self.check_available()?;
        self.updates.fetch_add(1, Ordering::SeqCst);

        let mut users = self.users.lock().unwrap();
        let user = users
            .values_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        if let Some(first_name) = &changes.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &changes.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(username) = &changes.username {
            user.username = username.clone();
        }
        if let Some(avatar_url) = &changes.avatar_url {
            user.avatar_url = avatar_url.clone();
        }
        user.updated_at = Utc::now().to_rfc3339();
        Ok(user.clone())
    }
}

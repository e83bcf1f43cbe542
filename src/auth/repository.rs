//! User persistence for the login flow

use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

use super::models::{NewUser, ProfileChanges, User};
use crate::common::generate_user_id;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("a user with this telegram id already exists")]
    Conflict,

    #[error("user not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => RepoError::Conflict,
            _ => RepoError::Database(err),
        }
    }
}

/// Narrow storage contract used by the identity resolver and session extractor.
///
/// Implementations must enforce uniqueness of `telegram_id` and report a
/// violation on create as [`RepoError::Conflict`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, RepoError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepoError>;

    async fn create_user(&self, profile: &NewUser) -> Result<User, RepoError>;

    async fn update_user(&self, id: &str, changes: &ProfileChanges) -> Result<User, RepoError>;
}

#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    db: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_telegram_id(&self, telegram_id: i64) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE telegram_id = ?")
            .bind(telegram_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, profile: &NewUser) -> Result<User, RepoError> {
        let id = generate_user_id();

        sqlx::query(
            "INSERT INTO users (id, telegram_id, first_name, last_name, username, avatar_url) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(profile.telegram_id)
        .bind(&profile.first_name)
        .bind(profile.last_name.as_deref())
        .bind(profile.username.as_deref())
        .bind(profile.avatar_url.as_deref())
        .execute(&self.db)
        .await?;

        debug!(user_id = %id, telegram_id = profile.telegram_id, "Inserted user row");

        let user = self.find_by_id(&id).await?;
        user.ok_or(RepoError::NotFound(id))
    }

    async fn update_user(&self, id: &str, changes: &ProfileChanges) -> Result<User, RepoError> {
        // Build dynamic update query
        let mut updates = Vec::new();
        let mut params: Vec<Option<String>> = Vec::new();

        if let Some(first_name) = &changes.first_name {
            updates.push("first_name = ?");
            params.push(Some(first_name.clone()));
        }
        if let Some(last_name) = &changes.last_name {
            updates.push("last_name = ?");
            params.push(last_name.clone());
        }
        if let Some(username) = &changes.username {
            updates.push("username = ?");
            params.push(username.clone());
        }
        if let Some(avatar_url) = &changes.avatar_url {
            updates.push("avatar_url = ?");
            params.push(avatar_url.clone());
        }

        if !updates.is_empty() {
            updates.push("updated_at = datetime('now')");
            let query = format!("UPDATE users SET {} WHERE id = ?", updates.join(", "));

            let mut query_builder = sqlx::query(&query);
            for param in params {
                query_builder = query_builder.bind(param);
            }

            let result = query_builder.bind(id).execute(&self.db).await?;
            if result.rows_affected() == 0 {
                return Err(RepoError::NotFound(id.to_string()));
            }

            debug!(user_id = %id, fields = ?changes.changed_fields(), "Updated user profile");
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::migrations::init_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        init_database(&pool).await.unwrap();
        pool
    }

    fn profile(telegram_id: i64) -> NewUser {
        NewUser {
            telegram_id,
            first_name: "Ann".to_string(),
            last_name: None,
            username: Some("ann".to_string()),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = SqliteUserRepository::new(setup_test_db().await);

        let created = repo.create_user(&profile(42)).await.unwrap();
        assert!(created.id.starts_with("U_"));
        assert_eq!(created.telegram_id, 42);
        assert_eq!(created.username.as_deref(), Some("ann"));

        let by_telegram = repo.find_by_telegram_id(42).await.unwrap();
        assert_eq!(by_telegram.as_ref(), Some(&created));

        let by_id = repo.find_by_id(&created.id).await.unwrap();
        assert_eq!(by_id, Some(created));

        assert_eq!(repo.find_by_telegram_id(43).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_telegram_id_is_conflict() {
        let repo = SqliteUserRepository::new(setup_test_db().await);

        repo.create_user(&profile(7)).await.unwrap();
        let second = repo.create_user(&profile(7)).await;
        assert!(matches!(second, Err(RepoError::Conflict)));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let repo = SqliteUserRepository::new(setup_test_db().await);
        let created = repo.create_user(&profile(9)).await.unwrap();

        let changes = ProfileChanges {
            username: Some(None),
            avatar_url: Some(Some("https://t.me/i/9.jpg".to_string())),
            ..Default::default()
        };
        let updated = repo.update_user(&created.id, &changes).await.unwrap();

        assert_eq!(updated.first_name, "Ann");
        assert_eq!(updated.username, None);
        assert_eq!(updated.avatar_url.as_deref(), Some("https://t.me/i/9.jpg"));
    }

    #[tokio::test]
    async fn test_update_unknown_user() {
        let repo = SqliteUserRepository::new(setup_test_db().await);
        let changes = ProfileChanges {
            first_name: Some("Bob".to_string()),
            ..Default::default()
        };
        let result = repo.update_user("U_MISSING", &changes).await;
        assert!(matches!(result, Err(RepoError::NotFound(_))));
    }
}

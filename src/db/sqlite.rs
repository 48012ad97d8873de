use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use super::CredentialStore;
use crate::{
    auth::PasswordHasher,
    error::{AppError, AppResult},
};

/// Accounts in a single SQLite `users` table
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    hasher: PasswordHasher,
}

impl SqliteStore {
    /// Opens (creating if needed) the database and applies migrations
    ///
    /// A single connection is kept open so `sqlite::memory:` databases live
    /// as long as the store.
    pub async fn connect(database_url: &str, hasher: PasswordHasher) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool, hasher })
    }
}

#[async_trait::async_trait]
impl CredentialStore for SqliteStore {
    async fn verify(&self, username: &str, password: &str) -> AppResult<bool> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        match stored {
            Some(hash) => self.hasher.verify_blocking(password, &hash).await,
            None => Ok(false),
        }
    }

    async fn create(&self, username: &str, password: &str) -> AppResult<bool> {
        let hash = self.hasher.hash_blocking(password).await?;
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, preferences, created_at)
            VALUES (?, ?, '[]', ?)
            ON CONFLICT(username) DO NOTHING
            "#,
        )
        .bind(username)
        .bind(hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_preferences(&self, username: &str) -> AppResult<BTreeSet<String>> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT preferences FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        let json = stored.ok_or_else(|| AppError::NotFound(format!("user {}", username)))?;
        Ok(serde_json::from_str(&json)?)
    }

    async fn save_preferences(
        &self,
        username: &str,
        preferences: &BTreeSet<String>,
    ) -> AppResult<()> {
        let json = serde_json::to_string(preferences)?;
        let result = sqlx::query("UPDATE users SET preferences = ? WHERE username = ?")
            .bind(json)
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user {}", username)));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:", PasswordHasher::new(10))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_verify() {
        let store = memory_store().await;
        assert!(store.create("ana", "secret").await.unwrap());
        assert!(store.verify("ana", "secret").await.unwrap());
        assert!(!store.verify("ana", "wrong").await.unwrap());
        assert!(!store.verify("bob", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_keeps_first_password() {
        let store = memory_store().await;
        assert!(store.create("ana", "first").await.unwrap());
        assert!(!store.create("ana", "second").await.unwrap());

        assert!(store.verify("ana", "first").await.unwrap());
        assert!(!store.verify("ana", "second").await.unwrap());
    }

    #[tokio::test]
    async fn test_password_is_not_stored_in_plaintext() {
        let store = memory_store().await;
        store.create("ana", "secret").await.unwrap();
        let stored: String =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE username = 'ana'")
                .fetch_one(&store.pool)
                .await
                .unwrap();
        assert!(stored.starts_with("pbkdf2_sha256$"));
        assert!(!stored.contains("secret"));
    }

    #[tokio::test]
    async fn test_preferences_round_trip() {
        let store = memory_store().await;
        store.create("ana", "secret").await.unwrap();
        assert!(store.get_preferences("ana").await.unwrap().is_empty());

        let prefs: BTreeSet<String> = ["Jazz", "Rock"].iter().map(|s| s.to_string()).collect();
        store.save_preferences("ana", &prefs).await.unwrap();
        assert_eq!(store.get_preferences("ana").await.unwrap(), prefs);
    }

    #[tokio::test]
    async fn test_preferences_of_unknown_user() {
        let store = memory_store().await;
        assert!(matches!(
            store.get_preferences("ghost").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.save_preferences("ghost", &BTreeSet::new()).await,
            Err(AppError::NotFound(_))
        ));
    }
}

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::{
    auth::PasswordHasher,
    config::{Config, StoreBackend},
    error::AppResult,
};

pub mod json_file;
pub mod sqlite;

pub use json_file::JsonFileStore;
pub use sqlite::SqliteStore;

/// Account persistence
///
/// Implementations own password hashing: callers pass plaintext passwords and
/// only hashes ever reach storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Whether the password matches the stored hash; unknown users never match
    async fn verify(&self, username: &str, password: &str) -> AppResult<bool>;

    /// Creates an account, returning `false` if the username is taken
    async fn create(&self, username: &str, password: &str) -> AppResult<bool>;

    /// Saved genres of an existing account
    async fn get_preferences(&self, username: &str) -> AppResult<BTreeSet<String>>;

    /// Replaces the saved genres of an existing account
    async fn save_preferences(
        &self,
        username: &str,
        preferences: &BTreeSet<String>,
    ) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Opens the credential store selected by the configuration
pub async fn open_store(config: &Config) -> AppResult<Arc<dyn CredentialStore>> {
    let hasher = PasswordHasher::new(config.password_iterations);
    let store: Arc<dyn CredentialStore> = match config.store_backend {
        StoreBackend::Sqlite => Arc::new(SqliteStore::connect(&config.database_url, hasher).await?),
        StoreBackend::Json => Arc::new(JsonFileStore::open(&config.accounts_path, hasher).await?),
    };

    tracing::info!(backend = store.name(), "Credential store ready");
    Ok(store)
}

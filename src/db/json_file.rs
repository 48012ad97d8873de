use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use super::CredentialStore;
use crate::{
    auth::PasswordHasher,
    error::{AppError, AppResult},
    models::UserAccount,
};

/// Accounts in a single JSON object keyed by username
///
/// The whole file is rewritten on every change.
pub struct JsonFileStore {
    path: PathBuf,
    hasher: PasswordHasher,
    accounts: Mutex<BTreeMap<String, UserAccount>>,
}

impl JsonFileStore {
    /// Loads the accounts file; a missing or empty file means no accounts
    pub async fn open(path: impl AsRef<Path>, hasher: PasswordHasher) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();

        let accounts = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), accounts = accounts.len(), "Accounts file loaded");

        Ok(Self {
            path,
            hasher,
            accounts: Mutex::new(accounts),
        })
    }

    async fn persist(&self, accounts: &BTreeMap<String, UserAccount>) -> AppResult<()> {
        let json = serde_json::to_string_pretty(accounts)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CredentialStore for JsonFileStore {
    async fn verify(&self, username: &str, password: &str) -> AppResult<bool> {
        let stored = {
            let accounts = self.accounts.lock().await;
            accounts
                .get(username)
                .map(|account| account.password_hash.clone())
        };
        match stored {
            Some(hash) => self.hasher.verify_blocking(password, &hash).await,
            None => Ok(false),
        }
    }

    async fn create(&self, username: &str, password: &str) -> AppResult<bool> {
        if self.accounts.lock().await.contains_key(username) {
            return Ok(false);
        }

        // Hash outside the lock; the name is checked again before inserting
        let hash = self.hasher.hash_blocking(password).await?;

        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(username) {
            return Ok(false);
        }
        let account = UserAccount::new(username, hash);
        accounts.insert(username.to_string(), account);
        if let Err(e) = self.persist(&accounts).await {
            accounts.remove(username);
            return Err(e);
        }
        Ok(true)
    }

    async fn get_preferences(&self, username: &str) -> AppResult<BTreeSet<String>> {
        let accounts = self.accounts.lock().await;
        accounts
            .get(username)
            .map(|account| account.preferences.clone())
            .ok_or_else(|| AppError::NotFound(format!("user {}", username)))
    }

    async fn save_preferences(
        &self,
        username: &str,
        preferences: &BTreeSet<String>,
    ) -> AppResult<()> {
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .get_mut(username)
            .ok_or_else(|| AppError::NotFound(format!("user {}", username)))?;
        let previous = std::mem::replace(&mut account.preferences, preferences.clone());

        if let Err(e) = self.persist(&accounts).await {
            if let Some(account) = accounts.get_mut(username) {
                account.preferences = previous;
            }
            return Err(e);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

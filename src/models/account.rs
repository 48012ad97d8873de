use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user as persisted by a credential store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAccount {
    pub username: String,
    /// Encoded PBKDF2 hash, never the plaintext password
    pub password_hash: String,
    /// Saved genre names
    #[serde(default)]
    pub preferences: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Creates a new account with no saved preferences
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            preferences: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Merges genres into the saved preferences; existing entries are never removed
    pub fn add_preferences<I, S>(&mut self, genres: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferences.extend(genres.into_iter().map(Into::into));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account() {
        let account = UserAccount::new("ana", "pbkdf2_sha256$1$00$00");
        assert_eq!(account.username, "ana");
        assert!(account.preferences.is_empty());
    }

    #[test]
    fn test_add_preferences_accumulates() {
        let mut account = UserAccount::new("ana", "hash");
        account.add_preferences(["Rock", "Jazz"]);
        account.add_preferences(["Jazz", "Folk"]);
        let saved: Vec<&str> = account.preferences.iter().map(String::as_str).collect();
        assert_eq!(saved, vec!["Folk", "Jazz", "Rock"]);
    }

    #[test]
    fn test_missing_preferences_deserialize_as_empty() {
        let json = r#"{"username":"ana","password_hash":"h","created_at":"2024-01-01T00:00:00Z"}"#;
        let account: UserAccount = serde_json::from_str(json).unwrap();
        assert!(account.preferences.is_empty());
    }
}

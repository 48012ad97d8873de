use std::collections::BTreeSet;

use crate::{
    db::CredentialStore,
    error::{AppError, AppResult},
};

/// Trims the username and rejects blank credentials
pub fn validate_credentials(username: &str, password: &str) -> AppResult<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidInput("username must not be empty".to_string()));
    }
    if password.is_empty() {
        return Err(AppError::InvalidInput("password must not be empty".to_string()));
    }
    Ok(username.to_string())
}

/// Creates an account; fails with `UserExists` when the name is taken
pub async fn register(
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
) -> AppResult<String> {
    let username = validate_credentials(username, password)?;

    if !store.create(&username, password).await? {
        tracing::info!(username = %username, "Registration rejected, user exists");
        return Err(AppError::UserExists(username));
    }

    tracing::info!(username = %username, backend = store.name(), "Account created");
    Ok(username)
}

/// Checks credentials and returns the account's saved genres
pub async fn login(
    store: &dyn CredentialStore,
    username: &str,
    password: &str,
) -> AppResult<(String, BTreeSet<String>)> {
    let username = validate_credentials(username, password)?;

    if !store.verify(&username, password).await? {
        tracing::info!(username = %username, "Login failed");
        return Err(AppError::InvalidCredentials);
    }

    let preferences = store.get_preferences(&username).await?;
    tracing::info!(username = %username, saved = preferences.len(), "Login succeeded");
    Ok((username, preferences))
}

/// Adds genres to the account's saved set and returns the merged set
///
/// Saved preferences only grow; genres are never removed.
pub async fn save_preferences(
    store: &dyn CredentialStore,
    username: &str,
    genres: &[String],
) -> AppResult<BTreeSet<String>> {
    let mut merged = store.get_preferences(username).await?;
    merged.extend(genres.iter().cloned());
    store.save_preferences(username, &merged).await?;

    tracing::info!(username = %username, saved = merged.len(), "Preferences saved");
    Ok(merged)
}

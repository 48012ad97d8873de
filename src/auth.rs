//! Password hashing
//!
//! Hashes are stored as `pbkdf2_sha256$<iterations>$<salt hex>$<hash hex>` so
//! the round count can change without invalidating existing accounts.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{AppError, AppResult};

const SCHEME: &str = "pbkdf2_sha256";
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Salted PBKDF2-SHA256 password hasher
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: iterations.max(1),
        }
    }

    /// Hashes a password with a fresh random salt
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);

        let hash = derive(password, &salt, self.iterations);
        format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            hex::encode(salt),
            hex::encode(hash)
        )
    }

    /// Checks a password against an encoded hash in constant time
    pub fn verify(&self, password: &str, encoded: &str) -> AppResult<bool> {
        let parsed = ParsedHash::parse(encoded)?;
        let computed = derive(password, &parsed.salt, parsed.iterations);
        Ok(computed.as_slice().ct_eq(parsed.hash.as_slice()).into())
    }

    /// `hash` on the blocking thread pool
    pub async fn hash_blocking(&self, password: &str) -> AppResult<String> {
        let hasher = *self;
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))
    }

    /// `verify` on the blocking thread pool
    pub async fn verify_blocking(&self, password: &str, encoded: &str) -> AppResult<bool> {
        let hasher = *self;
        let password = password.to_string();
        let encoded = encoded.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &encoded))
            .await
            .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))?
    }
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut hash);
    hash
}

struct ParsedHash {
    iterations: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl ParsedHash {
    fn parse(encoded: &str) -> AppResult<Self> {
        let malformed = || AppError::Internal("malformed password hash".to_string());

        let mut parts = encoded.split('$');
        if parts.next() != Some(SCHEME) {
            return Err(malformed());
        }
        let iterations = parts
            .next()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|&n| n > 0)
            .ok_or_else(malformed)?;
        let salt = parts
            .next()
            .and_then(|s| hex::decode(s).ok())
            .ok_or_else(malformed)?;
        let hash = parts
            .next()
            .and_then(|s| hex::decode(s).ok())
            .filter(|h| h.len() == HASH_LENGTH)
            .ok_or_else(malformed)?;
        if parts.next().is_some() {
            return Err(malformed());
        }

        Ok(Self {
            iterations,
            salt,
            hash,
        })
    }
}

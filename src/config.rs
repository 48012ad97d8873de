use serde::Deserialize;

/// Which credential store backs user accounts
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Sqlite,
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the track catalog (CSV, or JSON when the extension is `.json`)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Credential store backend
    #[serde(default = "default_store_backend")]
    pub store_backend: StoreBackend,

    /// SQLite connection URL, used by the sqlite backend
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Accounts file, used by the json backend
    #[serde(default = "default_accounts_path")]
    pub accounts_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Selections in one genre before the exploration nudge fires
    #[serde(default = "default_concentration_threshold")]
    pub concentration_threshold: u32,

    /// Number of tracks sampled for the recommendation list
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Maximum number of suggested genres; unset shows all of them
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: Option<usize>,

    /// Whether genre and track selection require a logged-in session
    #[serde(default)]
    pub require_login: bool,

    /// PBKDF2 rounds for newly hashed passwords
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,
}

fn default_catalog_path() -> String {
    "songs.csv".to_string()
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Sqlite
}

fn default_database_url() -> String {
    "sqlite://genre_compass.db?mode=rwc".to_string()
}

fn default_accounts_path() -> String {
    "users.json".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_concentration_threshold() -> u32 {
    5
}

fn default_sample_size() -> usize {
    5
}

fn default_suggestion_limit() -> Option<usize> {
    Some(3)
}

fn default_password_iterations() -> u32 {
    100_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            store_backend: default_store_backend(),
            database_url: default_database_url(),
            accounts_path: default_accounts_path(),
            host: default_host(),
            port: default_port(),
            concentration_threshold: default_concentration_threshold(),
            sample_size: default_sample_size(),
            suggestion_limit: default_suggestion_limit(),
            require_login: false,
            password_iterations: default_password_iterations(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

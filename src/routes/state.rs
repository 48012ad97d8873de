use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    config::Config,
    db::CredentialStore,
    error::{AppError, AppResult},
    models::{view::RenderOptions, Catalog, PageView, Session},
    services::catalog::CatalogLoader,
};

/// Behavior switches derived from the configuration
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub threshold: u32,
    pub render: RenderOptions,
    pub require_login: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            threshold: config.concentration_threshold,
            render: RenderOptions {
                sample_size: config.sample_size,
                suggestion_limit: config.suggestion_limit,
            },
            require_login: config.require_login,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogLoader>,
    pub store: Arc<dyn CredentialStore>,
    pub sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    pub settings: Settings,
}

impl AppState {
    pub fn new(catalog: CatalogLoader, store: Arc<dyn CredentialStore>, settings: Settings) -> Self {
        Self {
            catalog: Arc::new(catalog),
            store,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            settings,
        }
    }

    /// The loaded catalog, or `CatalogUnavailable` when there is nothing to recommend
    pub fn catalog(&self) -> AppResult<&Catalog> {
        self.catalog.load().require()
    }

    /// Builds the view-model for a session
    pub fn render(&self, catalog: &Catalog, session: &Session) -> PageView {
        let mut rng = rand::thread_rng();
        PageView::render(catalog, session, self.settings.render, &mut rng)
    }
}

pub fn session_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("session {}", id))
}

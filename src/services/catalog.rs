use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::{
    error::{AppError, AppResult},
    models::Catalog,
};

/// Result of the one-time catalog load
///
/// A failed load still yields a (empty) catalog; `error` carries the message
/// shown to users in place of recommendations.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub catalog: Arc<Catalog>,
    pub error: Option<String>,
}

impl CatalogSnapshot {
    /// Returns the catalog, or the reason there is nothing to recommend
    pub fn require(&self) -> AppResult<&Catalog> {
        if let Some(error) = &self.error {
            return Err(AppError::CatalogUnavailable(error.clone()));
        }
        if self.catalog.is_empty() {
            return Err(AppError::CatalogUnavailable(
                "the catalog contains no tracks".to_string(),
            ));
        }
        Ok(&self.catalog)
    }
}

/// Reads the catalog file once and serves the cached result afterwards
#[derive(Debug)]
pub struct CatalogLoader {
    path: PathBuf,
    snapshot: OnceCell<CatalogSnapshot>,
}

impl CatalogLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: OnceCell::new(),
        }
    }

    /// Wraps an already-built catalog
    pub fn preloaded(catalog: Catalog) -> Self {
        let loader = Self::new(PathBuf::new());
        let _ = loader.snapshot.set(CatalogSnapshot {
            catalog: Arc::new(catalog),
            error: None,
        });
        loader
    }

    /// Loads the catalog on first call; later calls return the same snapshot
    pub fn load(&self) -> &CatalogSnapshot {
        self.snapshot.get_or_init(|| match Catalog::from_path(&self.path) {
            Ok(catalog) => {
                tracing::info!(
                    path = %self.path.display(),
                    tracks = catalog.len(),
                    genres = catalog.genres().len(),
                    "Catalog loaded"
                );
                CatalogSnapshot {
                    catalog: Arc::new(catalog),
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to load catalog");
                CatalogSnapshot {
                    catalog: Arc::new(Catalog::default()),
                    error: Some(format!("Error loading catalog: {}", e)),
                }
            }
        })
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::error;

use plotline_core::config::Config;
use plotline_core::SeriesSource;
use plotline_duckdb::DuckDbBackend;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// The DuckDB backend. Internally uses `Arc<tokio::sync::Mutex<Connection>>`
    /// so it is already cheap to clone and async-safe.
    pub db: Arc<DuckDbBackend>,

    /// Series reads go through the storage trait so handlers stay decoupled
    /// from DuckDB specifics. Points at the same backend as `db`.
    pub series: Arc<dyn SeriesSource>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    /// Fast in-process cache of known-valid `website_id` values.
    ///
    /// Populated lazily: the first request for a site triggers a DB lookup;
    /// subsequent requests hit the cache. Never invalidated during a server
    /// run (websites are not deleted at runtime).
    website_cache: Arc<RwLock<HashSet<String>>>,
}

impl AppState {
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        let db = Arc::new(db);
        Self {
            series: db.clone(),
            db,
            config: Arc::new(config),
            website_cache: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Return `true` if the `website_id` is known to exist.
    ///
    /// Checks the in-process cache first; on a cache miss falls back to a
    /// DuckDB query and populates the cache on success.
    pub async fn is_valid_website(&self, website_id: &str) -> bool {
        {
            let cache = self.website_cache.read().await;
            if cache.contains(website_id) {
                return true;
            }
        }

        match self.db.website_exists(website_id).await {
            Ok(true) => {
                let mut cache = self.website_cache.write().await;
                cache.insert(website_id.to_string());
                true
            }
            Ok(false) => false,
            Err(e) => {
                error!(website_id, error = %e, "website_exists DB lookup failed");
                false
            }
        }
    }
}

use maat_court_data::config::DatabaseConfig;
use maat_court_data::error::AppError;
use maat_court_data::store::SqliteStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Opens the configured SQLite database, creating its tables on first use.
pub(crate) fn open_store(config: &DatabaseConfig) -> Result<Arc<SqliteStore>, AppError> {
    let store = SqliteStore::open(&config.path)?;
    info!(path = %config.path.display(), "court data store opened");
    Ok(Arc::new(store))
}

use tracing::info;

use crate::config::Config;
use crate::error::AppError;
use crate::infra::db::ConnectionManager;
use crate::state::app_state::AppState;

/// Build the application context once at startup.
///
/// Opens the pool lazily: TLS files and pool bounds are checked here, the
/// first connection happens on the first request.
pub fn build_state(config: &Config) -> Result<AppState, AppError> {
    info!(
        "state=build source={} tls={}",
        config.source.as_str(),
        config.tls
    );
    let db = ConnectionManager::open(&config.database_url(), &config.pool, &config.tls)?;
    Ok(AppState::new(db))
}

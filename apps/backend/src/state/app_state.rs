use crate::infra::db::ConnectionManager;
use crate::services::server_info::ServerInfoService;

/// Application state containing shared resources
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pool and session factory
    pub db: ConnectionManager,
    /// Data access for server metadata
    pub server_info: ServerInfoService,
}

impl AppState {
    /// Create a new AppState around the given connection manager
    pub fn new(db: ConnectionManager) -> Self {
        let server_info = ServerInfoService::new(db.clone());
        Self { db, server_info }
    }

    /// Create a test AppState over an existing (usually mock) connection
    pub fn for_connection(conn: sea_orm::DatabaseConnection) -> Self {
        Self::new(ConnectionManager::from_connection(conn))
    }

    /// Release the pool. Idempotent.
    pub async fn shutdown(&self) -> Result<(), crate::error::AppError> {
        self.db.close().await
    }
}

use sea_orm::{ConnectionTrait, DatabaseTransaction, DbErr, Statement};
use tracing::info;

use crate::db::with_session;
use crate::error::AppError;
use crate::infra::db::ConnectionManager;

/// Prefix of the human-readable version string.
pub const VERSION_LABEL: &str = "PostgreSQL version";

const VERSION_SQL: &str = "SELECT version() AS version";

/// Read-only queries about the database server itself.
#[derive(Debug, Clone)]
pub struct ServerInfoService {
    db: ConnectionManager,
}

impl ServerInfoService {
    pub fn new(db: ConnectionManager) -> Self {
        Self { db }
    }

    /// `"PostgreSQL version: <banner>"`.
    ///
    /// Runs one statement in one transaction. A session is opened when the
    /// caller does not pass one; errors are returned as-is, without retry.
    pub async fn fetch_server_version(
        &self,
        session: Option<&DatabaseTransaction>,
    ) -> Result<String, AppError> {
        let echo = self.db.echo();
        let banner = with_session(&self.db, session, |txn| {
            Box::pin(select_version(txn, echo))
        })
        .await?;

        let info = format!("{VERSION_LABEL}: {banner}");
        info!(server_version = %banner, "server version fetched");
        Ok(info)
    }
}

async fn select_version<C>(conn: &C, echo: bool) -> Result<String, AppError>
where
    C: ConnectionTrait,
{
    if echo {
        info!(target: "pgprobe::sql", sql = VERSION_SQL, "execute");
    }

    let row = conn
        .query_one(Statement::from_string(
            conn.get_database_backend(),
            VERSION_SQL.to_string(),
        ))
        .await?
        .ok_or_else(|| {
            AppError::query(DbErr::RecordNotFound(
                "version() returned no rows".to_string(),
            ))
        })?;

    Ok(row.try_get::<String>("", "version")?)
}

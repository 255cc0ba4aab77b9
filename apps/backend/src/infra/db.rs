use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction, SqlxPostgresConnector, TransactionTrait};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::ConnectOptions;
use tracing::{debug, info, warn};

use crate::config::db::{PoolSettings, TlsMode, TlsSettings, TlsVerify, POOL_RECYCLE, POOL_TIMEOUT};
use crate::config::env::sanitize_db_url;
use crate::error::AppError;

/// Owns the connection pool and hands out sessions (one transaction each).
///
/// Cloning is cheap and every clone refers to the same pool, so closing one
/// closes them all.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

struct Inner {
    db: DatabaseConnection,
    echo: bool,
    closed: AtomicBool,
}

impl ConnectionManager {
    /// Build the pool for `connection_string`.
    ///
    /// Nothing touches the network here: pool bounds and TLS files are checked,
    /// then the pool is created lazily and connects on first use. Must be called
    /// from within a Tokio runtime (the pool spawns its reaper task).
    pub fn open(
        connection_string: &str,
        pool: &PoolSettings,
        tls: &TlsSettings,
    ) -> Result<Self, AppError> {
        pool.validate()?;
        if tls.mode == TlsMode::Required {
            tls.files.validate()?;
        }
        if tls.mode == TlsMode::Required && tls.verify == TlsVerify::InsecureSkipVerify {
            warn!(
                tls_verify = "insecure-skip-verify",
                "server certificate verification is disabled for the database connection"
            );
        }

        let options = connect_options(connection_string, pool, tls)?;

        let sqlx_pool = PgPoolOptions::new()
            .max_connections(pool.max_connections())
            .max_lifetime(POOL_RECYCLE)
            .acquire_timeout(POOL_TIMEOUT)
            .test_before_acquire(true)
            .connect_lazy_with(options);

        info!(
            "pool=create engine=postgres url={} pool_size={} max_overflow={} max_connections={} recycle_s={} acquire_timeout_s={} tls={}",
            sanitize_db_url(connection_string),
            pool.pool_size(),
            pool.max_overflow(),
            pool.max_connections(),
            POOL_RECYCLE.as_secs(),
            POOL_TIMEOUT.as_secs(),
            tls
        );

        let db = SqlxPostgresConnector::from_sqlx_postgres_pool(sqlx_pool);
        Ok(Self::with_echo(db, pool.echo))
    }

    /// Wrap an existing connection (used with mock databases in tests).
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self::with_echo(db, false)
    }

    fn with_echo(db: DatabaseConnection, echo: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                db,
                echo,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// The underlying session factory.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.inner.db
    }

    pub fn echo(&self) -> bool {
        self.inner.echo
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Start a session: one pooled connection, one open transaction.
    pub async fn session(&self) -> Result<DatabaseTransaction, AppError> {
        if self.is_closed() {
            return Err(AppError::connection("connection pool is closed"));
        }
        Ok(self.inner.db.begin().await?)
    }

    /// Dispose of this manager's pool. Safe to call more than once.
    pub async fn close(&self) -> Result<(), AppError> {
        self.close_engine(None).await
    }

    /// Dispose of `engine`, or of this manager's own pool when `None`.
    pub async fn close_engine(&self, engine: Option<DatabaseConnection>) -> Result<(), AppError> {
        if let Some(engine) = engine {
            engine.close().await?;
            info!("pool=closed engine=external");
            return Ok(());
        }

        if self.inner.closed.swap(true, Ordering::AcqRel) {
            debug!("pool=close skipped already_closed=true");
            return Ok(());
        }
        self.inner.db.close_by_ref().await?;
        info!("pool=closed");
        Ok(())
    }

    /// Take the connection back once this is the last handle.
    #[cfg(test)]
    pub(crate) fn into_connection(self) -> Option<DatabaseConnection> {
        Arc::try_unwrap(self.inner).ok().map(|inner| inner.db)
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("echo", &self.inner.echo)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

fn ssl_mode(verify: TlsVerify) -> PgSslMode {
    match verify {
        TlsVerify::Full => PgSslMode::VerifyFull,
        TlsVerify::CaOnly => PgSslMode::VerifyCa,
        TlsVerify::InsecureSkipVerify => PgSslMode::Require,
    }
}

/// Accepts `postgresql+<driver>://`, `postgresql://` and `postgres://`.
fn normalize_scheme(connection_string: &str) -> Result<String, AppError> {
    let (scheme, rest) = connection_string.split_once("://").ok_or_else(|| {
        AppError::config(format!(
            "connection string has no scheme: {}",
            sanitize_db_url(connection_string)
        ))
    })?;
    let dialect = scheme.split('+').next().unwrap_or(scheme);
    match dialect {
        "postgresql" | "postgres" => Ok(format!("postgres://{rest}")),
        other => Err(AppError::config(format!(
            "unsupported database scheme '{other}'"
        ))),
    }
}

fn connect_options(
    connection_string: &str,
    pool: &PoolSettings,
    tls: &TlsSettings,
) -> Result<PgConnectOptions, AppError> {
    let url = normalize_scheme(connection_string)?;
    let mut options = PgConnectOptions::from_str(&url).map_err(|e| {
        AppError::config(format!(
            "invalid connection string {}: {e}",
            sanitize_db_url(connection_string)
        ))
    })?;

    options = match tls.mode {
        TlsMode::Disabled => options.ssl_mode(PgSslMode::Disable),
        TlsMode::Required => options
            .ssl_mode(ssl_mode(tls.verify))
            .ssl_root_cert(&tls.files.ca)
            .ssl_client_cert(&tls.files.cert)
            .ssl_client_key(&tls.files.key),
    };

    if !pool.echo {
        options = options.disable_statement_logging();
    }
    Ok(options)
}

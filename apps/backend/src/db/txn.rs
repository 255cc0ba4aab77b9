use futures_util::future::BoxFuture;
use sea_orm::DatabaseTransaction;
use tracing::warn;

use crate::error::AppError;
use crate::infra::db::ConnectionManager;

/// Run `f` inside a session.
///
/// 1) If the caller passes a transaction → use it as-is (no commit/rollback here)
/// 2) Otherwise → open a session, run `f`, commit on Ok / roll back on Err
///
/// The original error from `f` is returned unchanged; a failed rollback is
/// only logged. The session is released on every path.
pub async fn with_session<R, F>(
    manager: &ConnectionManager,
    session: Option<&DatabaseTransaction>,
    f: F,
) -> Result<R, AppError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<R, AppError>>,
{
    if let Some(shared) = session {
        return f(shared).await;
    }

    let txn = manager.session().await?;
    let out = f(&txn).await;

    match out {
        Ok(val) => {
            txn.commit().await?;
            Ok(val)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback failed; keeping original error");
            }
            Err(err)
        }
    }
}

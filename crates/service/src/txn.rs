use sea_orm::{DatabaseTransaction, DbErr};
use tracing::warn;

use crate::errors::ServiceError;

/// Commit on success, roll back on failure; the operation's error wins over a failed rollback.
pub(crate) async fn finish<T>(txn: DatabaseTransaction, result: Result<T, DbErr>) -> Result<T, ServiceError> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rb) = txn.rollback().await {
                warn!(error = %rb, "rollback failed");
            }
            Err(e.into())
        }
    }
}

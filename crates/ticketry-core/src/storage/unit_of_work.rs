//! Unit of work
//!
//! One SQLite transaction spans one inbound operation. Every repository built
//! for that operation holds a clone of the same [`UnitOfWork`] and runs its
//! statements on the shared transaction, so nothing is visible to other
//! requests until [`UnitOfWork::commit`] succeeds. Dropping the last clone
//! without committing rolls the transaction back.
//!
//! Services never begin or commit; that is the job of whoever handles the
//! request (see [`crate::modules::in_transaction`]).

use std::sync::Arc;

use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::sync::{Mutex, OwnedMappedMutexGuard, OwnedMutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::storage::Database;

/// Guard over the live transaction of a unit of work
///
/// Owns its lock handle so repository futures stay `Send + 'static`.
pub type TxGuard =
    OwnedMappedMutexGuard<Option<Transaction<'static, Sqlite>>, Transaction<'static, Sqlite>>;

/// Shared handle to the transaction of one request
#[derive(Clone)]
pub struct UnitOfWork {
    inner: Arc<UnitOfWorkInner>,
}

struct UnitOfWorkInner {
    request_id: Uuid,
    tx: Arc<Mutex<Option<Transaction<'static, Sqlite>>>>,
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("request_id", &self.inner.request_id)
            .finish()
    }
}

impl UnitOfWork {
    /// Begin a unit of work on the given database
    pub async fn begin(db: &Database) -> Result<Self> {
        Self::begin_on(db.pool()).await
    }

    /// Begin a unit of work directly on a connection pool
    pub async fn begin_on(pool: &SqlitePool) -> Result<Self> {
        let tx = pool.begin().await?;
        let request_id = Uuid::new_v4();
        debug!(%request_id, "Unit of work started");

        Ok(Self {
            inner: Arc::new(UnitOfWorkInner {
                request_id,
                tx: Arc::new(Mutex::new(Some(tx))),
            }),
        })
    }

    /// Correlation id of the request this unit of work belongs to
    pub fn request_id(&self) -> Uuid {
        self.inner.request_id
    }

    /// Lock the live transaction for running statements
    ///
    /// Hold the guard only for the statements of one repository call.
    pub async fn transaction(&self) -> Result<TxGuard> {
        let guard = self.inner.tx.clone().lock_owned().await;
        OwnedMutexGuard::try_map(guard, |tx| tx.as_mut()).map_err(|_| Error::TransactionClosed)
    }

    /// Whether the transaction is still open
    pub async fn is_active(&self) -> bool {
        self.inner.tx.lock().await.is_some()
    }

    /// Commit everything done in this unit of work
    pub async fn commit(&self) -> Result<()> {
        let tx = self
            .inner
            .tx
            .lock()
            .await
            .take()
            .ok_or(Error::TransactionClosed)?;
        tx.commit().await?;
        debug!(request_id = %self.inner.request_id, "Unit of work committed");
        Ok(())
    }

    /// Discard everything done in this unit of work
    pub async fn rollback(&self) -> Result<()> {
        let tx = self
            .inner
            .tx
            .lock()
            .await
            .take()
            .ok_or(Error::TransactionClosed)?;
        tx.rollback().await?;
        debug!(request_id = %self.inner.request_id, "Unit of work rolled back");
        Ok(())
    }

    /// Commit on `Ok`, roll back on `Err`, and pass the outcome through
    pub async fn complete<T>(&self, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(
                        request_id = %self.inner.request_id,
                        error = %rollback_err,
                        "Rollback failed"
                    );
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn count_users(db: &Database) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        count
    }

    async fn insert_user(uow: &UnitOfWork, email: &str) -> Result<()> {
        let mut tx = uow.transaction().await?;
        sqlx::query(
            "INSERT INTO users (email, first_name, last_name, created_date) VALUES (?, 'A', 'B', '2025-01-01 00:00:00+00:00')",
        )
        .bind(email)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_persists() {
        let db = Database::in_memory().await.unwrap();
        let uow = UnitOfWork::begin(&db).await.unwrap();

        insert_user(&uow, "a@example.com").await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(count_users(&db).await, 1);
    }

    #[tokio::test]
    async fn test_rollback_discards() {
        let db = Database::in_memory().await.unwrap();
        let uow = UnitOfWork::begin(&db).await.unwrap();

        insert_user(&uow, "a@example.com").await.unwrap();
        uow.rollback().await.unwrap();

        assert_eq!(count_users(&db).await, 0);
    }

    #[tokio::test]
    async fn test_drop_without_commit_discards() {
        let db = Database::in_memory().await.unwrap();
        {
            let uow = UnitOfWork::begin(&db).await.unwrap();
            insert_user(&uow, "a@example.com").await.unwrap();
        }
        assert_eq!(count_users(&db).await, 0);
    }

    #[tokio::test]
    async fn test_clones_share_one_transaction() {
        let db = Database::in_memory().await.unwrap();
        let uow = UnitOfWork::begin(&db).await.unwrap();
        let other = uow.clone();

        insert_user(&uow, "a@example.com").await.unwrap();
        insert_user(&other, "b@example.com").await.unwrap();
        assert_eq!(uow.request_id(), other.request_id());

        other.commit().await.unwrap();
        assert!(!uow.is_active().await);
        assert_eq!(count_users(&db).await, 2);
    }

    #[tokio::test]
    async fn test_transaction_held_across_await_in_spawned_task() {
        let db = Database::in_memory().await.unwrap();
        let uow = UnitOfWork::begin(&db).await.unwrap();

        let worker = uow.clone();
        tokio::spawn(async move {
            insert_user(&worker, "a@example.com").await?;
            insert_user(&worker, "b@example.com").await
        })
        .await
        .unwrap()
        .unwrap();

        uow.commit().await.unwrap();
        assert_eq!(count_users(&db).await, 2);
    }

    #[tokio::test]
    async fn test_closed_unit_of_work_rejects_work() {
        let db = Database::in_memory().await.unwrap();
        let uow = UnitOfWork::begin(&db).await.unwrap();
        uow.commit().await.unwrap();

        assert!(matches!(
            insert_user(&uow, "a@example.com").await,
            Err(Error::TransactionClosed)
        ));
        assert!(matches!(uow.commit().await, Err(Error::TransactionClosed)));
    }

    #[tokio::test]
    async fn test_complete_rolls_back_on_error() {
        let db = Database::in_memory().await.unwrap();
        let uow = UnitOfWork::begin(&db).await.unwrap();

        insert_user(&uow, "a@example.com").await.unwrap();
        let outcome: Result<()> = Err(Error::invalid_operation("boom"));
        let result = uow.complete(outcome).await;

        assert!(result.unwrap_err().is_invalid_operation());
        assert_eq!(count_users(&db).await, 0);
    }
}

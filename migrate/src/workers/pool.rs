use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::error;

use crate::error::{ErrorKind, MigrateResult};
use crate::migrate_error;

#[derive(Debug)]
struct MigrationWorkerPoolInner {
    join_set: JoinSet<MigrateResult<()>>,
}

/// Pool for managing multiple migration workers.
///
/// [`MigrationWorkerPool`] owns the task of every migration worker spawned for
/// a pipeline run. It provides methods for spawning workers and waiting for the
/// completion of all of them, collecting every failure instead of stopping at
/// the first one.
#[derive(Debug, Clone)]
pub struct MigrationWorkerPool {
    inner: Arc<Mutex<MigrationWorkerPoolInner>>,
}

impl MigrationWorkerPool {
    /// Creates a new empty migration worker pool.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MigrationWorkerPoolInner {
                join_set: JoinSet::new(),
            })),
        }
    }

    /// Spawns a worker task into the pool.
    pub async fn spawn<F>(&self, future: F)
    where
        F: Future<Output = MigrateResult<()>> + Send + 'static,
    {
        let mut inner = self.inner.lock().await;
        inner.join_set.spawn(future);
    }

    /// Waits for all migration workers in the pool to complete.
    ///
    /// Failures and panics of individual workers are collected and returned as
    /// a single aggregated error once every worker has terminated.
    pub async fn wait_all(&self) -> MigrateResult<()> {
        let mut errors = Vec::new();

        loop {
            let result = {
                let mut inner = self.inner.lock().await;
                inner.join_set.join_next().await
            };

            let Some(result) = result else {
                // The join set is empty, all workers have completed.
                break;
            };

            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    error!(error = %err, "migration worker completed with an error");

                    errors.push(err);
                }
                Err(join_err) => {
                    errors.push(migrate_error!(
                        ErrorKind::MigrationWorkerPanic,
                        "Migration worker panicked",
                        join_err
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }
}

impl Default for MigrationWorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bail;

    #[tokio::test]
    async fn pool_waits_for_all_workers_to_succeed() {
        let pool = MigrationWorkerPool::new();

        for _ in 0..4 {
            pool.spawn(async { Ok(()) }).await;
        }

        assert!(pool.wait_all().await.is_ok());
    }

    #[tokio::test]
    async fn empty_pool_completes_immediately() {
        let pool = MigrationWorkerPool::new();

        assert!(pool.wait_all().await.is_ok());
    }

    #[tokio::test]
    async fn pool_aggregates_errors_from_multiple_workers() {
        let pool = MigrationWorkerPool::new();

        pool.spawn(async { Ok(()) }).await;
        pool.spawn(async { bail!(ErrorKind::DestinationWriteFailed, "Table write failed") })
            .await;
        pool.spawn(async { bail!(ErrorKind::InvalidFieldType, "Unexpected attribute type") })
            .await;

        let err = pool.wait_all().await.unwrap_err();
        let kinds = err.kinds();

        assert_eq!(kinds.len(), 2);
        assert!(kinds.contains(&ErrorKind::DestinationWriteFailed));
        assert!(kinds.contains(&ErrorKind::InvalidFieldType));
    }

    #[tokio::test]
    async fn pool_reports_worker_panics() {
        let pool = MigrationWorkerPool::new();

        pool.spawn(async { panic!("worker exploded") }).await;

        let err = pool.wait_all().await.unwrap_err();

        assert_eq!(err.kinds(), vec![ErrorKind::MigrationWorkerPanic]);
    }
}

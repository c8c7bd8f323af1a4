use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{Instrument, error, info};

use crate::batch::WorkBatch;
use crate::concurrency::shutdown::{ShutdownRx, ShutdownTx};
use crate::conversions::record::{item_from_record, record_from_item};
use crate::error::MigrateResult;
use crate::pipeline::PipelineId;
use crate::store::StoreClient;
use crate::workers::pool::MigrationWorkerPool;

/// Receiving half of the work channel, shared by all migration workers.
///
/// Workers compete for batches. The lock only covers the receive itself, so a
/// worker writing a batch never blocks its siblings from picking up the next
/// one.
pub type SharedWorkRx = Arc<Mutex<mpsc::Receiver<WorkBatch>>>;

/// Worker that migrates batches of records into the target table.
///
/// [`MigrationWorker`] pulls batches from the shared work channel until the
/// channel is closed and drained or the shutdown signal fires. Each batch is
/// decoded in full before its first write, so a batch carrying an undecodable
/// item is rejected without writing anything. A write failure mid-batch leaves
/// the records written before it in place.
///
/// When a batch fails, the worker triggers the pipeline's shutdown signal so
/// that the dispatch worker and sibling workers stop taking on new work, and
/// then terminates with the error.
#[derive(Debug)]
pub struct MigrationWorker<C> {
    pipeline_id: PipelineId,
    worker_id: u16,
    target_table: String,
    client: C,
    work_rx: SharedWorkRx,
    shutdown_tx: ShutdownTx,
    shutdown_rx: ShutdownRx,
}

impl<C> MigrationWorker<C>
where
    C: StoreClient + Clone + Send + Sync + 'static,
{
    pub fn new(
        pipeline_id: PipelineId,
        worker_id: u16,
        target_table: String,
        client: C,
        work_rx: SharedWorkRx,
        shutdown_tx: ShutdownTx,
        shutdown_rx: ShutdownRx,
    ) -> Self {
        Self {
            pipeline_id,
            worker_id,
            target_table,
            client,
            work_rx,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Spawns this worker into `pool`.
    pub async fn spawn_into_pool(self, pool: &MigrationWorkerPool) {
        let migration_worker_span = tracing::info_span!(
            "migration_worker",
            pipeline_id = self.pipeline_id,
            worker_id = self.worker_id
        );

        let fut = self.run().instrument(migration_worker_span);

        pool.spawn(fut).await;
    }

    async fn run(mut self) -> MigrateResult<()> {
        info!("starting migration worker");

        let mut processed_batches = 0_u64;

        loop {
            // Holding the receiver lock across the recv keeps batch handoff
            // atomic, and recv is cancel safe, so losing the select race to
            // shutdown never discards a batch.
            let work_rx = &self.work_rx;
            let receive = async move {
                let mut work_rx = work_rx.lock().await;
                work_rx.recv().await
            };

            let batch = tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    info!(processed_batches, "shutting down migration worker");

                    return Ok(());
                }

                batch = receive => batch,
            };

            let Some(batch) = batch else {
                info!(
                    processed_batches,
                    "work channel drained, migration worker completed successfully"
                );

                return Ok(());
            };

            if let Err(err) = self.execute(batch).await {
                error!(error = %err, "migration worker failed, shutting down the pipeline");

                // If there are no subscribers left, every other worker already
                // terminated on its own.
                let _ = self.shutdown_tx.shutdown();

                return Err(err);
            }

            processed_batches += 1;
        }
    }

    /// Migrates a single batch by decoding every item and writing the decoded
    /// records to the target table.
    async fn execute(&self, batch: WorkBatch) -> MigrateResult<()> {
        let mut records = Vec::with_capacity(batch.len());
        for item in batch.items() {
            records.push(record_from_item(item)?);
        }

        for record in records {
            self.client
                .put_item(&self.target_table, item_from_record(&record))
                .await?;
        }

        Ok(())
    }
}

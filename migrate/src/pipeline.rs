use std::sync::Arc;

use config::shared::PipelineConfig;
use dynamo::{AttributeValue, ScanExpression};
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info};

use crate::bail;
use crate::batch::split_into_batches;
use crate::concurrency::shutdown::{ShutdownTx, create_shutdown_channel};
use crate::conversions::record::{NAME_FIELD, PLATFORM_FIELD, USER_ID_FIELD};
use crate::error::{ErrorKind, MigrateResult};
use crate::scan::read_all_items;
use crate::store::StoreClient;
use crate::workers::base::{Worker, WorkerHandle};
use crate::workers::dispatch::{DispatchWorker, DispatchWorkerHandle};
use crate::workers::migration::MigrationWorker;
use crate::workers::pool::MigrationWorkerPool;

/// Capacity of the bounded work channel between the dispatch worker and the
/// migration workers.
///
/// A single slot keeps the dispatch worker at most one batch ahead of the
/// migration workers.
const WORK_CHANNEL_CAPACITY: usize = 1;

#[derive(Debug)]
enum PipelineState {
    NotStarted,
    Started {
        dispatch_worker: DispatchWorkerHandle,
        pool: MigrationWorkerPool,
    },
}

pub type PipelineId = u64;

/// Coordinator of a full table migration run.
///
/// [`Pipeline`] owns the lifecycle of a run: it reads the filtered source
/// table, splits the records into batches, starts the dispatch worker and the
/// migration workers, and joins them through [`Pipeline::wait`]. The store
/// client is injected at construction and shared by cloning.
#[derive(Debug)]
pub struct Pipeline<C> {
    id: PipelineId,
    config: Arc<PipelineConfig>,
    client: C,
    state: PipelineState,
    shutdown_tx: ShutdownTx,
}

impl<C> Pipeline<C>
where
    C: StoreClient + Clone + Send + Sync + 'static,
{
    pub fn new(id: PipelineId, config: PipelineConfig, client: C) -> Self {
        // We create a watch channel of unit types since this is just used to
        // notify all subscribers that shutdown is needed.
        //
        // Here we are not taking the `shutdown_rx` since we will just extract
        // it from the `shutdown_tx` via the `subscribe` method. This is done to
        // make the code cleaner.
        let (shutdown_tx, _) = create_shutdown_channel();

        Self {
            id,
            config: Arc::new(config),
            client,
            state: PipelineState::NotStarted,
            shutdown_tx,
        }
    }

    pub fn id(&self) -> PipelineId {
        self.id
    }

    pub fn shutdown_tx(&self) -> ShutdownTx {
        self.shutdown_tx.clone()
    }

    pub async fn start(&mut self) -> MigrateResult<()> {
        if let PipelineState::Started { .. } = self.state {
            bail!(
                ErrorKind::InvalidState,
                "Pipeline already started",
                format!("Pipeline with id {} was started twice", self.id)
            );
        }

        info!(
            store = C::name(),
            "starting migration pipeline from table '{}' to table '{}' with id {}",
            self.config.source_table, self.config.target_table, self.id
        );

        self.config.validate()?;

        // We read the full source table before starting any worker, so a scan
        // failure aborts the run with the target table untouched.
        let expression = ScanExpression::builder()
            .with_equals(
                PLATFORM_FIELD,
                AttributeValue::from(self.config.platform.as_str()),
            )
            .with_projection([USER_ID_FIELD, NAME_FIELD])
            .build();
        let items = read_all_items(&self.client, &self.config.source_table, &expression).await?;

        info!(
            "read {} records from table '{}'",
            items.len(),
            self.config.source_table
        );

        let batches = split_into_batches(items, self.config.batch.max_size);

        let (work_tx, work_rx) = mpsc::channel(WORK_CHANNEL_CAPACITY);
        let work_rx = Arc::new(Mutex::new(work_rx));

        // Every shutdown receiver is subscribed before any worker runs, since
        // a signal broadcast before subscription would not be observed.
        let dispatch_worker = DispatchWorker::new(
            self.id,
            batches,
            work_tx,
            self.shutdown_tx.subscribe(),
        )
        .start()
        .await?;

        let pool = MigrationWorkerPool::new();

        let migration_workers: Vec<_> = (0..self.config.worker_count)
            .map(|worker_id| {
                MigrationWorker::new(
                    self.id,
                    worker_id,
                    self.config.target_table.clone(),
                    self.client.clone(),
                    Arc::clone(&work_rx),
                    self.shutdown_tx.clone(),
                    self.shutdown_tx.subscribe(),
                )
            })
            .collect();
        for migration_worker in migration_workers {
            migration_worker.spawn_into_pool(&pool).await;
        }

        self.state = PipelineState::Started {
            dispatch_worker,
            pool,
        };

        Ok(())
    }

    /// Waits for the dispatch worker and every migration worker to terminate.
    ///
    /// This is the join point of a run. A pipeline that was never started
    /// reports [`ErrorKind::InvalidState`].
    pub async fn wait(self) -> MigrateResult<()> {
        let PipelineState::Started {
            dispatch_worker,
            pool,
        } = self.state
        else {
            bail!(
                ErrorKind::InvalidState,
                "Pipeline not started",
                "Waiting on a pipeline requires starting it first"
            );
        };

        info!("waiting for dispatch worker to complete");

        let mut errors = vec![];

        // We first wait for the dispatch worker to finish, since it owns the
        // sending half of the work channel and its termination is what closes
        // the channel for the migration workers.
        let dispatch_worker_result = dispatch_worker.wait().await;
        if let Err(err) = dispatch_worker_result {
            errors.push(err);

            // If we fail to send the shutdown signal, we are not going to
            // capture the error since it means that no migration workers are
            // running, which is fine.
            let _ = self.shutdown_tx.shutdown();

            info!("dispatch worker completed with an error, shutting down migration workers");
        }

        info!("waiting for migration workers to complete");

        let migration_workers_result = pool.wait_all().await;
        if let Err(err) = migration_workers_result {
            // We naively use the `kinds` as number of errors.
            let errors_number = err.kinds().len();

            errors.push(err);

            info!("{} migration workers failed with an error", errors_number);
        }

        if !errors.is_empty() {
            return Err(errors.into());
        }

        Ok(())
    }

    pub fn shutdown(&self) {
        info!("trying to shut down the pipeline");

        if let Err(err) = self.shutdown_tx.shutdown() {
            error!("failed to send shutdown signal to the pipeline: {}", err);
            return;
        }

        info!("shut down signal successfully sent to all workers");
    }

    pub async fn shutdown_and_wait(self) -> MigrateResult<()> {
        self.shutdown();
        self.wait().await
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, info};

use crate::batch::WorkBatch;
use crate::concurrency::shutdown::ShutdownRx;
use crate::error::{ErrorKind, MigrateError, MigrateResult};
use crate::migrate_error;
use crate::pipeline::PipelineId;
use crate::workers::base::{Worker, WorkerHandle};

/// Observable state of the dispatch worker.
///
/// Tracks how many batches were handed to the work channel. The counter only
/// grows, and once the worker terminates it holds the final number of
/// published batches.
#[derive(Debug, Clone, Default)]
pub struct DispatchWorkerState {
    published: Arc<AtomicU64>,
}

impl DispatchWorkerState {
    /// Returns the number of batches published to the work channel so far.
    pub fn published_batches(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    fn record_published(&self) {
        self.published.fetch_add(1, Ordering::AcqRel);
    }
}

/// Handle for monitoring the dispatch worker's progress and completion.
#[derive(Debug)]
pub struct DispatchWorkerHandle {
    state: DispatchWorkerState,
    handle: Option<JoinHandle<MigrateResult<()>>>,
}

impl WorkerHandle<DispatchWorkerState> for DispatchWorkerHandle {
    fn state(&self) -> DispatchWorkerState {
        self.state.clone()
    }

    async fn wait(mut self) -> MigrateResult<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        handle.await.map_err(|err| {
            migrate_error!(
                ErrorKind::DispatchWorkerPanic,
                "Dispatch worker panicked",
                err
            )
        })??;

        Ok(())
    }
}

/// Worker that publishes work batches to the migration workers.
///
/// [`DispatchWorker`] owns the sending half of the work channel. It publishes
/// the prepared batches in order and closes the channel by dropping the sender
/// when it stops, which is the only end-of-work signal the migration workers
/// receive. Publishing stops early when the shutdown signal fires or when
/// every migration worker is gone.
#[derive(Debug)]
pub struct DispatchWorker {
    pipeline_id: PipelineId,
    batches: Vec<WorkBatch>,
    work_tx: mpsc::Sender<WorkBatch>,
    shutdown_rx: ShutdownRx,
}

impl DispatchWorker {
    pub fn new(
        pipeline_id: PipelineId,
        batches: Vec<WorkBatch>,
        work_tx: mpsc::Sender<WorkBatch>,
        shutdown_rx: ShutdownRx,
    ) -> Self {
        Self {
            pipeline_id,
            batches,
            work_tx,
            shutdown_rx,
        }
    }
}

impl Worker<DispatchWorkerHandle, DispatchWorkerState> for DispatchWorker {
    type Error = MigrateError;

    async fn start(self) -> Result<DispatchWorkerHandle, MigrateError> {
        let DispatchWorker {
            pipeline_id,
            batches,
            work_tx,
            mut shutdown_rx,
        } = self;

        info!(batches = batches.len(), "starting dispatch worker");

        let state = DispatchWorkerState::default();
        let task_state = state.clone();

        let total_batches = batches.len();
        let dispatch_worker_span = tracing::info_span!(
            "dispatch_worker",
            pipeline_id,
            total_batches
        );
        let dispatch_worker = async move {
            for batch in batches {
                tokio::select! {
                    biased;

                    _ = shutdown_rx.changed() => {
                        info!(
                            published_batches = task_state.published_batches(),
                            total_batches,
                            "shutting down dispatch worker before publishing all batches"
                        );

                        return Ok(());
                    }

                    result = work_tx.send(batch) => {
                        if result.is_err() {
                            info!(
                                published_batches = task_state.published_batches(),
                                total_batches,
                                "work channel closed, no migration workers left to receive batches"
                            );

                            return Ok(());
                        }

                        task_state.record_published();
                    }
                }
            }

            info!(
                published_batches = task_state.published_batches(),
                "dispatch worker completed successfully"
            );

            Ok(())
        }
        .instrument(dispatch_worker_span.or_current());

        let handle = tokio::spawn(dispatch_worker);

        Ok(DispatchWorkerHandle {
            state,
            handle: Some(handle),
        })
    }
}

use std::future::Future;

use crate::error::MigrateResult;

/// A trait for types that represent asynchronous workers in the migration pipeline.
///
/// Workers perform a specific long-running task, like dispatching work batches or
/// writing records to the target table. The trait provides a standardized interface
/// for starting workers and obtaining handles to monitor their execution.
pub trait Worker<H, S>
where
    H: WorkerHandle<S>,
    S: Clone + Send,
{
    /// The error type returned when the worker fails to start.
    type Error;

    /// Starts the worker and returns a handle for monitoring its execution.
    fn start(self) -> impl Future<Output = Result<H, Self::Error>> + Send;
}

/// A handle to a running worker that allows monitoring its progress and completion.
///
/// Worker handles provide access to the worker's observable state and allow waiting
/// for the worker to finish. The handle outlives the worker itself, so state can be
/// inspected even after the worker terminated.
pub trait WorkerHandle<S>
where
    S: Clone + Send,
{
    /// Returns the current state of the worker.
    ///
    /// The state is shared with the running worker, so it reflects progress live.
    fn state(&self) -> S;

    /// Waits for the worker to complete and returns the result of its execution.
    ///
    /// A worker that panicked reports the panic as an error.
    fn wait(self) -> impl Future<Output = MigrateResult<()>> + Send;
}

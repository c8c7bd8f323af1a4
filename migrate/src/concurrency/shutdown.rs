//! Broadcast shutdown signaling for pipeline workers.
//!
//! Built on a [`watch`] channel carrying a unit value. Every worker holds its own
//! receiver clone, so a single [`ShutdownTx::shutdown`] call reaches all of them
//! regardless of what they are awaiting at that moment.

use tokio::sync::watch;
use tokio::sync::watch::error::SendError;

/// Transmitting half of the shutdown channel.
///
/// Cloning is cheap and every clone signals the same set of receivers.
#[derive(Debug, Clone)]
pub struct ShutdownTx(watch::Sender<()>);

impl ShutdownTx {
    /// Broadcasts the shutdown signal to all subscribed receivers.
    ///
    /// Fails only when no receivers are alive, which means every worker has
    /// already terminated.
    pub fn shutdown(&self) -> Result<(), SendError<()>> {
        self.0.send(())
    }

    /// Creates a new receiver subscribed to this transmitter.
    ///
    /// Signals broadcast before this call are marked as seen, so a receiver
    /// must be subscribed before [`ShutdownTx::shutdown`] is called to observe
    /// the shutdown through [`ShutdownRx::changed`].
    pub fn subscribe(&self) -> ShutdownRx {
        self.0.subscribe()
    }
}

/// Receiving half of the shutdown channel.
///
/// Workers await [`ShutdownRx::changed`] inside their select loops; the future
/// completes once the signal has been broadcast.
pub type ShutdownRx = watch::Receiver<()>;

/// Creates a connected shutdown channel pair.
pub fn create_shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = watch::channel(());

    (ShutdownTx(tx), rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_reaches_every_subscriber() {
        let (shutdown_tx, mut first_rx) = create_shutdown_channel();
        let mut second_rx = shutdown_tx.subscribe();

        shutdown_tx.shutdown().expect("receivers are alive");

        first_rx.changed().await.expect("signal is observed");
        second_rx.changed().await.expect("signal is observed");
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let (shutdown_tx, mut shutdown_rx) = create_shutdown_channel();

        shutdown_tx.shutdown().expect("receiver is alive");
        shutdown_tx.shutdown().expect("receiver is alive");

        shutdown_rx.changed().await.expect("signal is observed");
    }

    #[test]
    fn shutdown_without_receivers_fails() {
        let (shutdown_tx, shutdown_rx) = create_shutdown_channel();
        drop(shutdown_rx);

        assert!(shutdown_tx.shutdown().is_err());
    }
}

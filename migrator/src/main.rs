//! Table migrator binary.
//!
//! Runs the pipeline that copies filtered records from the source table to the
//! target table, with graceful shutdown and a verification read of the target
//! once the migration completed.

use telemetry::tracing::init_tracing;
use tracing::error;

use crate::core::start_migrator;

mod core;

fn main() -> anyhow::Result<()> {
    init_tracing(env!("CARGO_BIN_NAME"));

    // We start the runtime.
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())?;

    Ok(())
}

async fn async_main() -> anyhow::Result<()> {
    if let Err(err) = start_migrator().await {
        error!("{err}");

        return Err(err);
    }

    Ok(())
}

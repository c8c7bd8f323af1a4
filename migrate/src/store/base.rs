use std::future::Future;

use dynamo::{Item, ScanExpression, ScanPage};

use crate::error::MigrateResult;

/// Trait for document stores the pipeline can migrate between.
///
/// [`StoreClient`] implementations expose the two operations the pipeline is
/// built on: a paginated, filtered scan used by the source reader and a
/// keyed upsert used by the migration workers. One client serves both the
/// source and the target table of a run.
///
/// Implementations must be cheap to clone and safe for concurrent use, since
/// every migration worker holds its own clone and issues writes in parallel.
/// Writes must be idempotent upserts so that a record observed twice converges
/// to a single stored item.
pub trait StoreClient {
    /// Returns the name of the store implementation.
    fn name() -> &'static str;

    /// Reads one page of items from `table`.
    ///
    /// The expression's filter and projection are applied before items are
    /// returned. `start_key` continues a previous scan; the returned page
    /// carries the cursor for the next call, or `None` when the table is
    /// exhausted. Page boundaries are chosen by the store, and a page may be
    /// empty even when the scan is not finished.
    fn scan_page(
        &self,
        table: &str,
        expression: &ScanExpression,
        start_key: Option<Item>,
    ) -> impl Future<Output = MigrateResult<ScanPage>> + Send;

    /// Upserts a single item into `table`, keyed by the table's key attribute.
    fn put_item(&self, table: &str, item: Item) -> impl Future<Output = MigrateResult<()>> + Send;
}

//! Source reading through a paginated table scan.

use dynamo::{Item, ScanExpression};
use tracing::debug;

use crate::error::MigrateResult;
use crate::store::StoreClient;

/// Reads every item of `table` matching `expression`, across all scan pages.
///
/// Pages are requested sequentially, forwarding each returned cursor until the
/// store reports the final page. Items are returned in scan order; callers
/// never see page boundaries.
pub async fn read_all_items<C>(
    client: &C,
    table: &str,
    expression: &ScanExpression,
) -> MigrateResult<Vec<Item>>
where
    C: StoreClient,
{
    let mut items = Vec::new();
    let mut start_key = None;
    let mut pages = 0_u64;

    loop {
        let page = client.scan_page(table, expression, start_key).await?;
        pages += 1;
        items.extend(page.items);

        match page.last_evaluated_key {
            Some(cursor) => start_key = Some(cursor),
            None => break,
        }
    }

    debug!(table, pages, items = items.len(), "source scan complete");

    Ok(items)
}

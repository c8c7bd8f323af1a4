use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use dynamo::{Item, ScanExpression, ScanPage};

use crate::bail;
use crate::error::{ErrorKind, MigrateResult};
use crate::store::base::StoreClient;

/// One stored table: its key attribute and its items in insertion order.
#[derive(Debug)]
struct MemoryTable {
    key_attribute: String,
    items: Vec<Item>,
}

#[derive(Debug)]
struct Inner {
    tables: HashMap<String, MemoryTable>,
    page_size: Option<usize>,
}

/// In-memory store client for testing and development purposes.
///
/// [`MemoryStoreClient`] keeps every table in process memory and implements the
/// same scan and upsert semantics as the network client: scans apply the
/// expression's filter and projection, return items in a stable order, and page
/// through results with a continuation cursor; puts replace any item carrying
/// the same key attribute value. All data is lost when the process terminates.
///
/// # Examples
///
/// ```rust
/// use dynamo::{AttributeValue, Item, ScanExpression};
/// use migrate::store::StoreClient;
/// use migrate::store::memory::MemoryStoreClient;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MemoryStoreClient::with_page_size(2);
/// client.create_table("UsersOriginal", "user_id").await;
///
/// let item = Item::from([
///     ("user_id".to_owned(), AttributeValue::from(1)),
///     ("name".to_owned(), AttributeValue::from("ada")),
/// ]);
/// client.put_item("UsersOriginal", item).await?;
///
/// let page = client
///     .scan_page("UsersOriginal", &ScanExpression::default(), None)
///     .await?;
/// assert_eq!(page.items.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStoreClient {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStoreClient {
    /// Creates a new client with no tables and unbounded scan pages.
    pub fn new() -> Self {
        Self::with_inner(None)
    }

    /// Creates a new client whose scans return at most `page_size` items per page.
    ///
    /// Small page sizes force the source reader through its pagination loop,
    /// mirroring the page limits the network store imposes.
    pub fn with_page_size(page_size: usize) -> Self {
        Self::with_inner(Some(page_size))
    }

    fn with_inner(page_size: Option<usize>) -> Self {
        let inner = Inner {
            tables: HashMap::new(),
            page_size,
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Registers an empty table keyed by `key_attribute`.
    ///
    /// Replaces any existing table with the same name.
    pub async fn create_table(&self, table: &str, key_attribute: &str) {
        let mut inner = self.inner.lock().await;
        inner.tables.insert(
            table.to_owned(),
            MemoryTable {
                key_attribute: key_attribute.to_owned(),
                items: Vec::new(),
            },
        );
    }

    /// Upserts a batch of items into `table`, preserving their order.
    ///
    /// This method is useful for seeding tables before a run without going
    /// through [`StoreClient::put_item`].
    pub async fn insert_items(&self, table: &str, items: Vec<Item>) -> MigrateResult<()> {
        let mut inner = self.inner.lock().await;
        for item in items {
            inner.upsert(table, item)?;
        }

        Ok(())
    }

    /// Returns a copy of all items stored in `table`, in insertion order.
    ///
    /// This method is useful for verifying pipeline output in tests. An
    /// unknown table yields an empty vector.
    pub async fn table_items(&self, table: &str) -> Vec<Item> {
        let inner = self.inner.lock().await;
        inner
            .tables
            .get(table)
            .map(|table| table.items.clone())
            .unwrap_or_default()
    }
}

impl Default for MemoryStoreClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    /// Replaces the item carrying the same key attribute value or appends a new one.
    fn upsert(&mut self, table: &str, item: Item) -> MigrateResult<()> {
        let Some(stored_table) = self.tables.get_mut(table) else {
            bail!(
                ErrorKind::DestinationWriteFailed,
                "Table not found in memory store",
                format!("Table `{table}` was never created")
            );
        };

        let Some(key) = item.get(&stored_table.key_attribute) else {
            bail!(
                ErrorKind::DestinationWriteFailed,
                "Item is missing the table key attribute",
                format!(
                    "Table `{table}` is keyed by `{}`",
                    stored_table.key_attribute
                )
            );
        };

        let position = stored_table
            .items
            .iter()
            .position(|stored| stored.get(&stored_table.key_attribute) == Some(key));
        match position {
            Some(position) => stored_table.items[position] = item,
            None => stored_table.items.push(item),
        }

        Ok(())
    }
}

impl StoreClient for MemoryStoreClient {
    fn name() -> &'static str {
        "memory"
    }

    async fn scan_page(
        &self,
        table: &str,
        expression: &ScanExpression,
        start_key: Option<Item>,
    ) -> MigrateResult<ScanPage> {
        let inner = self.inner.lock().await;

        let Some(stored_table) = inner.tables.get(table) else {
            bail!(
                ErrorKind::SourceScanFailed,
                "Table not found in memory store",
                format!("Table `{table}` was never created")
            );
        };

        let start_index = match start_key {
            Some(cursor) => {
                let Some(key) = cursor.get(&stored_table.key_attribute) else {
                    bail!(
                        ErrorKind::SourceScanFailed,
                        "Invalid scan cursor",
                        format!(
                            "Cursor is missing the `{}` key attribute",
                            stored_table.key_attribute
                        )
                    );
                };

                let position = stored_table
                    .items
                    .iter()
                    .position(|stored| stored.get(&stored_table.key_attribute) == Some(key));
                let Some(position) = position else {
                    bail!(
                        ErrorKind::SourceScanFailed,
                        "Invalid scan cursor",
                        "Cursor does not point at a stored item"
                    );
                };

                position + 1
            }
            None => 0,
        };

        // All remaining matches, paired with the raw item carrying the cursor key.
        let matching: Vec<(&Item, Item)> = stored_table.items[start_index..]
            .iter()
            .filter(|item| expression.matches(item))
            .map(|item| (item, expression.project(item)))
            .collect();

        let page_size = inner.page_size.unwrap_or(matching.len().max(1));
        let remaining = matching.len() > page_size;

        let mut items = Vec::with_capacity(matching.len().min(page_size));
        let mut last_raw_item = None;
        for (raw, projected) in matching.into_iter().take(page_size) {
            items.push(projected);
            last_raw_item = Some(raw);
        }

        let last_evaluated_key = match (remaining, last_raw_item) {
            (true, Some(raw)) => raw
                .get(&stored_table.key_attribute)
                .cloned()
                .map(|value| Item::from([(stored_table.key_attribute.clone(), value)])),
            _ => None,
        };

        debug!(
            table,
            items = items.len(),
            has_more = last_evaluated_key.is_some(),
            "scanned memory table page"
        );

        Ok(ScanPage {
            items,
            last_evaluated_key,
        })
    }

    async fn put_item(&self, table: &str, item: Item) -> MigrateResult<()> {
        let mut inner = self.inner.lock().await;

        info!(table, "upserting item into memory table");

        inner.upsert(table, item)
    }
}

#[cfg(test)]
mod tests {
    use dynamo::AttributeValue;

    use super::*;

    fn user(id: i64, platform: &str, name: &str) -> Item {
        Item::from([
            ("user_id".to_owned(), AttributeValue::from(id)),
            ("platform".to_owned(), AttributeValue::from(platform)),
            ("name".to_owned(), AttributeValue::from(name)),
        ])
    }

    async fn seeded_client(page_size: usize) -> MemoryStoreClient {
        let client = MemoryStoreClient::with_page_size(page_size);
        client.create_table("users", "user_id").await;
        client
            .insert_items(
                "users",
                vec![
                    user(1, "ios", "ada"),
                    user(2, "android", "grace"),
                    user(3, "ios", "joan"),
                    user(4, "ios", "mary"),
                ],
            )
            .await
            .unwrap();

        client
    }

    #[test]
    fn name_identifies_the_store_implementation() {
        assert_eq!(MemoryStoreClient::name(), "memory");
    }

    #[tokio::test]
    async fn put_replaces_item_with_same_key() {
        let client = seeded_client(10).await;

        client
            .put_item("users", user(2, "android", "renamed"))
            .await
            .unwrap();

        let items = client.table_items("users").await;
        assert_eq!(items.len(), 4);
        assert_eq!(
            items[1].get("name"),
            Some(&AttributeValue::from("renamed"))
        );
    }

    #[tokio::test]
    async fn put_into_unknown_table_fails() {
        let client = MemoryStoreClient::new();

        let err = client
            .put_item("missing", user(1, "ios", "ada"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DestinationWriteFailed);
    }

    #[tokio::test]
    async fn put_without_key_attribute_fails() {
        let client = MemoryStoreClient::new();
        client.create_table("users", "user_id").await;

        let err = client
            .put_item(
                "users",
                Item::from([("name".to_owned(), AttributeValue::from("ada"))]),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DestinationWriteFailed);
    }

    #[tokio::test]
    async fn scan_of_unknown_table_fails() {
        let client = MemoryStoreClient::new();

        let err = client
            .scan_page("missing", &ScanExpression::default(), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SourceScanFailed);
    }

    #[tokio::test]
    async fn scan_applies_filter_and_projection() {
        let client = seeded_client(10).await;
        let expression = ScanExpression::builder()
            .with_equals("platform", AttributeValue::from("ios"))
            .with_projection(["user_id", "name"])
            .build();

        let page = client.scan_page("users", &expression, None).await.unwrap();

        assert_eq!(page.items.len(), 3);
        assert!(page.last_evaluated_key.is_none());
        for item in &page.items {
            assert_eq!(item.len(), 2);
            assert!(!item.contains_key("platform"));
        }
    }

    #[tokio::test]
    async fn scan_pages_through_matches_with_cursor() {
        let client = seeded_client(2).await;
        let expression = ScanExpression::builder()
            .with_equals("platform", AttributeValue::from("ios"))
            .build();

        let first = client.scan_page("users", &expression, None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        let cursor = first.last_evaluated_key.clone().unwrap();
        assert_eq!(cursor.get("user_id"), Some(&AttributeValue::from(3)));

        let second = client
            .scan_page("users", &expression, first.last_evaluated_key)
            .await
            .unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(second.last_evaluated_key.is_none());
        assert_eq!(
            second.items[0].get("name"),
            Some(&AttributeValue::from("mary"))
        );
    }

    #[tokio::test]
    async fn scan_with_stale_cursor_fails() {
        let client = seeded_client(2).await;
        let cursor = Item::from([("user_id".to_owned(), AttributeValue::from(99))]);

        let err = client
            .scan_page("users", &ScanExpression::default(), Some(cursor))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SourceScanFailed);
    }

    #[tokio::test]
    async fn empty_table_scans_to_a_single_empty_page() {
        let client = MemoryStoreClient::with_page_size(2);
        client.create_table("users", "user_id").await;

        let page = client
            .scan_page("users", &ScanExpression::default(), None)
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert!(page.last_evaluated_key.is_none());
    }
}

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use dynamo::{Item, ScanExpression, ScanPage};

use crate::conversions::record::USER_ID_FIELD;
use crate::error::{ErrorKind, MigrateResult};
use crate::migrate_error;
use crate::store::StoreClient;

struct Inner<C> {
    wrapped_client: C,
    scan_calls: u64,
    put_calls: u64,
    fail_put_user_ids: HashSet<i64>,
}

/// Test wrapper for [`StoreClient`] implementations that tracks all operations.
///
/// [`TestClientWrapper`] wraps any store client, counts every scan and put
/// issued through it, and can inject write failures for chosen user ids. This
/// enables assertions on pipeline behavior without a special-purpose client.
/// Injected failures never reach the wrapped client, so the stored data stays
/// consistent with what the pipeline believes it wrote.
#[derive(Clone)]
pub struct TestClientWrapper<C> {
    inner: Arc<RwLock<Inner<C>>>,
}

impl<C> TestClientWrapper<C> {
    /// Creates a new test wrapper around any store client implementation.
    pub fn wrap(client: C) -> Self {
        let inner = Inner {
            wrapped_client: client,
            scan_calls: 0,
            put_calls: 0,
            fail_put_user_ids: HashSet::new(),
        };

        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Returns how many scan pages have been requested through this wrapper.
    pub async fn scan_calls(&self) -> u64 {
        self.inner.read().await.scan_calls
    }

    /// Returns how many puts have been attempted through this wrapper.
    ///
    /// Injected failures count as attempts.
    pub async fn put_calls(&self) -> u64 {
        self.inner.read().await.put_calls
    }

    /// Makes every future put of an item carrying one of `user_ids` fail.
    pub async fn fail_puts_for_user_ids(&self, user_ids: impl IntoIterator<Item = i64>) {
        let mut inner = self.inner.write().await;
        inner.fail_put_user_ids.extend(user_ids);
    }
}

impl<C> StoreClient for TestClientWrapper<C>
where
    C: StoreClient + Send + Sync + Clone,
{
    fn name() -> &'static str {
        "wrapper"
    }

    async fn scan_page(
        &self,
        table: &str,
        expression: &ScanExpression,
        start_key: Option<Item>,
    ) -> MigrateResult<ScanPage> {
        let client = {
            let mut inner = self.inner.write().await;
            inner.scan_calls += 1;
            inner.wrapped_client.clone()
        };

        client.scan_page(table, expression, start_key).await
    }

    async fn put_item(&self, table: &str, item: Item) -> MigrateResult<()> {
        let client = {
            let mut inner = self.inner.write().await;
            inner.put_calls += 1;

            let injected = item
                .get(USER_ID_FIELD)
                .and_then(|value| value.as_n())
                .and_then(|raw| raw.parse::<i64>().ok())
                .is_some_and(|id| inner.fail_put_user_ids.contains(&id));
            if injected {
                return Err(migrate_error!(
                    ErrorKind::DestinationWriteFailed,
                    "Injected write failure",
                    format!("Writes into `{table}` fail for this user id by test request")
                ));
            }

            inner.wrapped_client.clone()
        };

        client.put_item(table, item).await
    }
}

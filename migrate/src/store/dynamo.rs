use config::shared::StoreConfig;
use dynamo::{DynamoClient, Item, ScanExpression, ScanPage};

use crate::error::MigrateResult;
use crate::store::base::StoreClient;

/// Store client backed by the network DynamoDB-compatible API.
///
/// Thin wrapper over [`DynamoClient`] that converts transport errors into
/// pipeline error kinds. Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct DynamoStoreClient {
    client: DynamoClient,
}

impl DynamoStoreClient {
    /// Wraps an already connected client.
    pub fn new(client: DynamoClient) -> Self {
        Self { client }
    }

    /// Builds a client from the supplied store configuration.
    pub async fn connect(store: &StoreConfig) -> Self {
        Self::new(DynamoClient::connect(store).await)
    }
}

impl StoreClient for DynamoStoreClient {
    fn name() -> &'static str {
        "dynamo"
    }

    async fn scan_page(
        &self,
        table: &str,
        expression: &ScanExpression,
        start_key: Option<Item>,
    ) -> MigrateResult<ScanPage> {
        Ok(self.client.scan_page(table, expression, start_key).await?)
    }

    async fn put_item(&self, table: &str, item: Item) -> MigrateResult<()> {
        Ok(self.client.put_item(table, item).await?)
    }
}

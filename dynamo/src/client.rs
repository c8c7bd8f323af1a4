use std::collections::HashMap;

use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue as SdkAttributeValue;
use thiserror::Error;
use tracing::debug;

use config::shared::StoreConfig;

use crate::expression::ScanExpression;
use crate::types::{AttributeValue, Item};

/// Name reported to the credential provider chain for static credentials.
const CREDENTIALS_PROVIDER_NAME: &str = "migrator-config";

type BoxDynError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by [`DynamoClient`] operations.
#[derive(Debug, Error)]
pub enum DynamoError {
    /// A scan request failed.
    #[error("scan of table `{table}` failed: {source}")]
    Scan {
        table: String,
        #[source]
        source: BoxDynError,
    },
    /// A put request failed.
    #[error("put into table `{table}` failed: {source}")]
    Put {
        table: String,
        #[source]
        source: BoxDynError,
    },
    /// A stored item used an attribute value type this model does not carry.
    #[error("unsupported attribute value type `{0}` in stored item")]
    UnsupportedAttributeValue(&'static str),
}

/// One page of scan results.
#[derive(Debug, Clone)]
pub struct ScanPage {
    /// Items of this page, in scan order.
    pub items: Vec<Item>,
    /// Continuation cursor; `None` exactly when this page is the final one.
    pub last_evaluated_key: Option<Item>,
}

/// Shared handle to the document store hosting both migration tables.
///
/// Cheap to clone; the underlying client is safe for concurrent use by all
/// pipeline workers.
#[derive(Debug, Clone)]
pub struct DynamoClient {
    client: Client,
}

impl DynamoClient {
    /// Builds a client from the supplied store configuration.
    ///
    /// Static credentials and the endpoint override are applied when
    /// configured; otherwise the ambient credential chain and the regional
    /// endpoint are used. No network traffic happens until the first request.
    pub async fn connect(store: &StoreConfig) -> Self {
        let mut config_loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(store.region.clone()));

        if let Some((access_key_id, secret_access_key)) = store.static_credentials() {
            let credentials = aws_sdk_dynamodb::config::Credentials::new(
                access_key_id,
                secret_access_key,
                None,
                None,
                CREDENTIALS_PROVIDER_NAME,
            );
            config_loader = config_loader.credentials_provider(credentials);
        }

        let aws_config = config_loader.load().await;

        let mut config_builder = aws_sdk_dynamodb::config::Builder::from(&aws_config);
        if let Some(endpoint) = &store.endpoint {
            config_builder = config_builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(config_builder.build()),
        }
    }

    /// Fetches one page of a filtered, projected scan.
    ///
    /// The page size is bounded by the store's own response size limit; the
    /// returned cursor resumes the scan where this page ended.
    pub async fn scan_page(
        &self,
        table: &str,
        expression: &ScanExpression,
        start_key: Option<Item>,
    ) -> Result<ScanPage, DynamoError> {
        let rendered = expression.render();

        let output = self
            .client
            .scan()
            .table_name(table)
            .set_filter_expression(rendered.filter_expression)
            .set_projection_expression(rendered.projection_expression)
            .set_expression_attribute_names(non_empty(rendered.expression_attribute_names))
            .set_expression_attribute_values(
                non_empty(rendered.expression_attribute_values).map(|values| {
                    values
                        .into_iter()
                        .map(|(placeholder, value)| (placeholder, to_sdk_value(&value)))
                        .collect()
                }),
            )
            .set_exclusive_start_key(start_key.as_ref().map(to_sdk_item))
            .send()
            .await
            .map_err(|source| DynamoError::Scan {
                table: table.to_string(),
                source: Box::new(source),
            })?;

        let items = output
            .items
            .unwrap_or_default()
            .iter()
            .map(from_sdk_item)
            .collect::<Result<Vec<_>, _>>()?;

        let last_evaluated_key = output
            .last_evaluated_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .map(from_sdk_item)
            .transpose()?;

        debug!(
            table,
            items = items.len(),
            has_more = last_evaluated_key.is_some(),
            "fetched scan page"
        );

        Ok(ScanPage {
            items,
            last_evaluated_key,
        })
    }

    /// Writes one item, overwriting any existing item with the same key.
    pub async fn put_item(&self, table: &str, item: Item) -> Result<(), DynamoError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(to_sdk_item(&item)))
            .send()
            .await
            .map_err(|source| DynamoError::Put {
                table: table.to_string(),
                source: Box::new(source),
            })?;

        Ok(())
    }
}

fn non_empty<V>(map: HashMap<String, V>) -> Option<HashMap<String, V>> {
    (!map.is_empty()).then_some(map)
}

fn to_sdk_item(item: &Item) -> HashMap<String, SdkAttributeValue> {
    item.iter()
        .map(|(name, value)| (name.clone(), to_sdk_value(value)))
        .collect()
}

fn from_sdk_item(item: &HashMap<String, SdkAttributeValue>) -> Result<Item, DynamoError> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), from_sdk_value(value)?)))
        .collect()
}

fn to_sdk_value(value: &AttributeValue) -> SdkAttributeValue {
    match value {
        AttributeValue::S(value) => SdkAttributeValue::S(value.clone()),
        AttributeValue::N(value) => SdkAttributeValue::N(value.clone()),
        AttributeValue::Bool(value) => SdkAttributeValue::Bool(*value),
        AttributeValue::Null => SdkAttributeValue::Null(true),
        AttributeValue::Ss(values) => SdkAttributeValue::Ss(values.clone()),
        AttributeValue::Ns(values) => SdkAttributeValue::Ns(values.clone()),
        AttributeValue::L(values) => {
            SdkAttributeValue::L(values.iter().map(to_sdk_value).collect())
        }
        AttributeValue::M(map) => SdkAttributeValue::M(
            map.iter()
                .map(|(name, value)| (name.clone(), to_sdk_value(value)))
                .collect(),
        ),
    }
}

fn from_sdk_value(value: &SdkAttributeValue) -> Result<AttributeValue, DynamoError> {
    let converted = match value {
        SdkAttributeValue::S(value) => AttributeValue::S(value.clone()),
        SdkAttributeValue::N(value) => AttributeValue::N(value.clone()),
        SdkAttributeValue::Bool(value) => AttributeValue::Bool(*value),
        SdkAttributeValue::Null(_) => AttributeValue::Null,
        SdkAttributeValue::Ss(values) => AttributeValue::Ss(values.clone()),
        SdkAttributeValue::Ns(values) => AttributeValue::Ns(values.clone()),
        SdkAttributeValue::L(values) => AttributeValue::L(
            values
                .iter()
                .map(from_sdk_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        SdkAttributeValue::M(map) => AttributeValue::M(
            map.iter()
                .map(|(name, value)| Ok((name.clone(), from_sdk_value(value)?)))
                .collect::<Result<HashMap<_, _>, DynamoError>>()?,
        ),
        SdkAttributeValue::B(_) => return Err(DynamoError::UnsupportedAttributeValue("B")),
        SdkAttributeValue::Bs(_) => return Err(DynamoError::UnsupportedAttributeValue("BS")),
        _ => return Err(DynamoError::UnsupportedAttributeValue("unknown")),
    };

    Ok(converted)
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::primitives::Blob;

    use super::*;

    #[test]
    fn supported_values_round_trip_through_sdk_form() {
        let item = Item::from([
            ("user_id".to_string(), AttributeValue::N("1".to_string())),
            ("name".to_string(), AttributeValue::S("alice".to_string())),
            ("active".to_string(), AttributeValue::Bool(true)),
            ("notes".to_string(), AttributeValue::Null),
            (
                "tags".to_string(),
                AttributeValue::Ss(vec!["a".to_string(), "b".to_string()]),
            ),
            (
                "scores".to_string(),
                AttributeValue::Ns(vec!["1".to_string(), "2".to_string()]),
            ),
            (
                "history".to_string(),
                AttributeValue::L(vec![AttributeValue::N("3".to_string())]),
            ),
            (
                "meta".to_string(),
                AttributeValue::M(Item::from([(
                    "source".to_string(),
                    AttributeValue::S("import".to_string()),
                )])),
            ),
        ]);

        let round_tripped = from_sdk_item(&to_sdk_item(&item)).unwrap();
        assert_eq!(round_tripped, item);
    }

    #[test]
    fn binary_values_are_rejected() {
        let sdk_item = HashMap::from([(
            "payload".to_string(),
            SdkAttributeValue::B(Blob::new(vec![1u8, 2, 3])),
        )]);

        let result = from_sdk_item(&sdk_item);
        assert!(matches!(
            result,
            Err(DynamoError::UnsupportedAttributeValue("B"))
        ));
    }
}

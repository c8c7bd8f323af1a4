use serde::{Deserialize, Serialize};

use crate::SerializableSecretString;
use crate::shared::ValidationError;

/// Connection settings for the document store hosting both migration tables.
///
/// The endpoint override and static credential pair exist for local stacks
/// (e.g. LocalStack on `http://localhost:4566`); against a real deployment
/// both are left unset and the ambient credential chain is used instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreConfig {
    /// Region the tables live in.
    pub region: String,
    /// Endpoint URL override for local deployments; `None` uses the regional endpoint.
    pub endpoint: Option<String>,
    /// Static access key id; when unset, credentials are resolved from the environment.
    pub access_key_id: Option<String>,
    /// Static secret access key. Sensitive and redacted in debug output.
    pub secret_access_key: Option<SerializableSecretString>,
}

impl StoreConfig {
    /// Validates the [`StoreConfig`].
    ///
    /// The region must be set, and static credentials are only accepted as a
    /// complete pair.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.region.is_empty() {
            return Err(ValidationError::EmptyField("store.region"));
        }

        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(ValidationError::PartialStaticCredentials);
        }

        Ok(())
    }

    /// Returns the static credential pair when both halves are configured.
    pub fn static_credentials(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => {
                Some((access_key_id.as_str(), secret_access_key.expose_secret()))
            }
            _ => None,
        }
    }
}

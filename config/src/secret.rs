use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A secret string that can round-trip through serde.
///
/// Wraps [`SecretString`] so that configuration files can carry credentials
/// while debug output stays redacted. Serialization exposes the secret, so
/// serialized forms must be treated as sensitive.
#[derive(Clone)]
pub struct SerializableSecretString(SecretString);

impl SerializableSecretString {
    /// Returns the wrapped secret in clear text.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SerializableSecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SerializableSecretString([REDACTED])")
    }
}

impl From<String> for SerializableSecretString {
    fn from(value: String) -> Self {
        Self(SecretString::new(value))
    }
}

impl From<SecretString> for SerializableSecretString {
    fn from(value: SecretString) -> Self {
        Self(value)
    }
}

impl Serialize for SerializableSecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.expose_secret())
    }
}

impl<'de> Deserialize<'de> for SerializableSecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;

        Ok(Self(SecretString::new(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let secret = SerializableSecretString::from("hunter2".to_string());

        let rendered = format!("{secret:?}");
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn serde_round_trip_preserves_value() {
        let secret = SerializableSecretString::from("localstack".to_string());

        let serialized = serde_json::to_string(&secret).unwrap();
        assert_eq!(serialized, "\"localstack\"");

        let deserialized: SerializableSecretString = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.expose_secret(), "localstack");
    }
}

use std::collections::HashMap;

/// A single tagged value in a stored item, mirroring the store's wire format.
///
/// Numbers are carried in their decimal string wire form; parsing into a
/// concrete numeric type is deferred to whoever consumes the value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// UTF-8 string.
    S(String),
    /// Number in decimal string form.
    N(String),
    /// Boolean.
    Bool(bool),
    /// Null marker.
    Null,
    /// Set of strings.
    Ss(Vec<String>),
    /// Set of numbers in decimal string form.
    Ns(Vec<String>),
    /// Heterogeneous list.
    L(Vec<AttributeValue>),
    /// Nested item.
    M(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Returns the contained string when this value is an `S`.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the contained number string when this value is an `N`.
    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttributeValue::N(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the store's type tag for this value, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeValue::S(_) => "S",
            AttributeValue::N(_) => "N",
            AttributeValue::Bool(_) => "BOOL",
            AttributeValue::Null => "NULL",
            AttributeValue::Ss(_) => "SS",
            AttributeValue::Ns(_) => "NS",
            AttributeValue::L(_) => "L",
            AttributeValue::M(_) => "M",
        }
    }

    /// Renders the value as JSON for human-readable output.
    ///
    /// Numbers that fit the JSON number model are rendered as numbers,
    /// otherwise their string form is kept.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttributeValue::S(value) => serde_json::Value::String(value.clone()),
            AttributeValue::N(value) => number_to_json(value),
            AttributeValue::Bool(value) => serde_json::Value::Bool(*value),
            AttributeValue::Null => serde_json::Value::Null,
            AttributeValue::Ss(values) => serde_json::Value::Array(
                values
                    .iter()
                    .map(|value| serde_json::Value::String(value.clone()))
                    .collect(),
            ),
            AttributeValue::Ns(values) => {
                serde_json::Value::Array(values.iter().map(|value| number_to_json(value)).collect())
            }
            AttributeValue::L(values) => {
                serde_json::Value::Array(values.iter().map(AttributeValue::to_json).collect())
            }
            AttributeValue::M(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::S(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::S(value.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::N(value.to_string())
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

/// A stored item: a mapping from attribute name to tagged value.
pub type Item = HashMap<String, AttributeValue>;

/// Renders a whole item as a JSON object for human-readable output.
pub fn item_to_json(item: &Item) -> serde_json::Value {
    serde_json::Value::Object(
        item.iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

fn number_to_json(value: &str) -> serde_json::Value {
    if let Ok(integer) = value.parse::<i64>() {
        return serde_json::Value::Number(integer.into());
    }

    if let Ok(float) = value.parse::<f64>()
        && let Some(number) = serde_json::Number::from_f64(float)
    {
        return serde_json::Value::Number(number);
    }

    serde_json::Value::String(value.to_string())
}

use dynamo::{AttributeValue, Item};

use crate::conversions::record::{NAME_FIELD, PLATFORM_FIELD, USER_ID_FIELD};

/// Builds a fully populated item as stored in the source table.
pub fn source_item(id: i64, platform: &str, name: &str) -> Item {
    Item::from([
        (USER_ID_FIELD.to_owned(), AttributeValue::from(id)),
        (PLATFORM_FIELD.to_owned(), AttributeValue::from(platform)),
        (NAME_FIELD.to_owned(), AttributeValue::from(name)),
    ])
}

/// Builds an item shaped like the target table schema.
///
/// Matches what the pipeline writes for a migrated record: the key and the
/// name, with no platform attribute.
pub fn target_item(id: i64, name: &str) -> Item {
    Item::from([
        (USER_ID_FIELD.to_owned(), AttributeValue::from(id)),
        (NAME_FIELD.to_owned(), AttributeValue::from(name)),
    ])
}

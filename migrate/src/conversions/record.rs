use dynamo::{AttributeValue, Item};

use crate::bail;
use crate::error::{ErrorKind, MigrateResult};
use crate::types::UserRecord;

/// Attribute holding the numeric record identifier, also the target upsert key.
pub const USER_ID_FIELD: &str = "user_id";
/// Attribute holding the record display name.
pub const NAME_FIELD: &str = "name";
/// Attribute the source scan filters on.
pub const PLATFORM_FIELD: &str = "platform";

/// Decodes a stored item into a [`UserRecord`].
///
/// `user_id` must be a numeric attribute holding a decimal integer and `name`
/// must be a string attribute. `platform` is carried over only when present as
/// a string, since the scan projection usually omits it.
pub fn record_from_item(item: &Item) -> MigrateResult<UserRecord> {
    let Some(user_id) = item.get(USER_ID_FIELD) else {
        bail!(
            ErrorKind::MissingRequiredField,
            "Missing required field",
            format!("Attribute `{USER_ID_FIELD}` is absent from the scanned item")
        );
    };
    let Some(raw_id) = user_id.as_n() else {
        bail!(
            ErrorKind::InvalidFieldType,
            "Invalid field type",
            format!(
                "Attribute `{USER_ID_FIELD}` must be numeric (received: {})",
                user_id.type_name()
            )
        );
    };
    let Ok(id) = raw_id.parse::<i64>() else {
        bail!(
            ErrorKind::InvalidFieldType,
            "Invalid field type",
            format!("Attribute `{USER_ID_FIELD}` is not a decimal integer (received: {raw_id})")
        );
    };

    let Some(name) = item.get(NAME_FIELD) else {
        bail!(
            ErrorKind::MissingRequiredField,
            "Missing required field",
            format!("Attribute `{NAME_FIELD}` is absent from the scanned item")
        );
    };
    let Some(name) = name.as_s() else {
        bail!(
            ErrorKind::InvalidFieldType,
            "Invalid field type",
            format!(
                "Attribute `{NAME_FIELD}` must be a string (received: {})",
                name.type_name()
            )
        );
    };

    let platform = item
        .get(PLATFORM_FIELD)
        .and_then(AttributeValue::as_s)
        .map(str::to_owned);

    Ok(UserRecord {
        id,
        platform,
        name: name.to_owned(),
    })
}

/// Encodes a [`UserRecord`] into the attribute map written to the target table.
///
/// The platform attribute is not part of the target schema and is dropped.
pub fn item_from_record(record: &UserRecord) -> Item {
    Item::from([
        (
            USER_ID_FIELD.to_owned(),
            AttributeValue::N(record.id.to_string()),
        ),
        (
            NAME_FIELD.to_owned(),
            AttributeValue::S(record.name.clone()),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_item(id: &str, platform: &str, name: &str) -> Item {
        Item::from([
            (USER_ID_FIELD.to_owned(), AttributeValue::N(id.to_owned())),
            (
                PLATFORM_FIELD.to_owned(),
                AttributeValue::S(platform.to_owned()),
            ),
            (NAME_FIELD.to_owned(), AttributeValue::S(name.to_owned())),
        ])
    }

    #[test]
    fn decodes_full_item() {
        let record = record_from_item(&source_item("42", "ios", "ada")).unwrap();

        assert_eq!(
            record,
            UserRecord {
                id: 42,
                platform: Some("ios".to_owned()),
                name: "ada".to_owned(),
            }
        );
    }

    #[test]
    fn decodes_projected_item_without_platform() {
        let mut item = source_item("7", "ios", "grace");
        item.remove(PLATFORM_FIELD);

        let record = record_from_item(&item).unwrap();

        assert_eq!(record.id, 7);
        assert_eq!(record.platform, None);
    }

    #[test]
    fn missing_user_id_is_reported() {
        let mut item = source_item("1", "ios", "ada");
        item.remove(USER_ID_FIELD);

        let err = record_from_item(&item).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        assert!(err.detail().unwrap().contains(USER_ID_FIELD));
    }

    #[test]
    fn missing_name_is_reported() {
        let mut item = source_item("1", "ios", "ada");
        item.remove(NAME_FIELD);

        let err = record_from_item(&item).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingRequiredField);
        assert!(err.detail().unwrap().contains(NAME_FIELD));
    }

    #[test]
    fn string_typed_user_id_is_rejected() {
        let mut item = source_item("1", "ios", "ada");
        item.insert(USER_ID_FIELD.to_owned(), AttributeValue::from("1"));

        let err = record_from_item(&item).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidFieldType);
    }

    #[test]
    fn non_integer_user_id_is_rejected() {
        let err = record_from_item(&source_item("not-a-number", "ios", "ada")).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidFieldType);
        assert!(err.detail().unwrap().contains("not-a-number"));
    }

    #[test]
    fn encoding_drops_the_platform() {
        let record = UserRecord {
            id: 9,
            platform: Some("ios".to_owned()),
            name: "joan".to_owned(),
        };

        let item = item_from_record(&record);

        assert_eq!(item.len(), 2);
        assert_eq!(
            item.get(USER_ID_FIELD),
            Some(&AttributeValue::N("9".to_owned()))
        );
        assert_eq!(
            item.get(NAME_FIELD),
            Some(&AttributeValue::S("joan".to_owned()))
        );
        assert!(!item.contains_key(PLATFORM_FIELD));
    }

    #[test]
    fn decode_then_encode_preserves_key_and_name() {
        let source = source_item("-3", "ios", "mary");

        let record = record_from_item(&source).unwrap();
        let target = item_from_record(&record);

        assert_eq!(target.get(USER_ID_FIELD), source.get(USER_ID_FIELD));
        assert_eq!(target.get(NAME_FIELD), source.get(NAME_FIELD));
    }
}

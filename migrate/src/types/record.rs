/// Typed view of one user row flowing through the pipeline.
///
/// A [`UserRecord`] is decoded from the attribute map returned by the source
/// scan and encoded back into an attribute map before the target write. The
/// numeric identifier is the upsert key of the target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Numeric identifier stored as the `user_id` attribute.
    pub id: i64,
    /// Platform the record was filtered on.
    ///
    /// `None` when the scan projection omitted the attribute. The value is
    /// never written to the target table.
    pub platform: Option<String>,
    /// Display name stored as the `name` attribute.
    pub name: String,
}

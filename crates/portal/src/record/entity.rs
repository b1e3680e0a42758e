use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::stage::{Stage, StageTable};

/// JSON keys every record serializes with.
pub const ID_KEY: &str = "id";
pub const CREATED_DATE_KEY: &str = "createdDate";
pub const UPDATED_DATE_KEY: &str = "updatedDate";

/// A domain entity kept in a record store collection.
///
/// Records serialize to camelCase JSON objects carrying at least `id`,
/// `createdDate` and `updatedDate`; the store relies on those keys when
/// merging patches.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Stage: Stage;
    /// Caller-supplied attributes for a new record.
    type Draft: Send;

    /// Persistence key of the collection.
    const COLLECTION: &'static str;
    /// Prefix of generated ids.
    const ID_PREFIX: &'static str;
    /// Fields a free-text search looks at when the caller names none.
    const SEARCH_FIELDS: &'static [&'static str];

    fn stage_table() -> StageTable<Self::Stage>;

    /// Builds a fresh record at `stage` with zeroed progress and both
    /// timestamps set to `now`.
    fn from_draft(id: String, draft: Self::Draft, stage: Self::Stage, now: DateTime<Utc>)
        -> Self;

    fn id(&self) -> &str;
    fn stage(&self) -> Self::Stage;
    fn set_stage(&mut self, stage: Self::Stage);
    fn created_date(&self) -> DateTime<Utc>;
    fn updated_date(&self) -> DateTime<Utc>;
    fn set_updated_date(&mut self, now: DateTime<Utc>);

    /// Text value of a named domain field, for search and exact matching.
    fn field(&self, name: &str) -> Option<Cow<'_, str>>;

    fn set_progress(&mut self, _progress: u8) {}

    /// Checks domain invariants serde cannot express. Runs on every patched
    /// record before it is written.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Stamps the named date field. Returns false if the record has no such
    /// field.
    fn stamp(&mut self, _field: &str, _now: DateTime<Utc>) -> bool {
        false
    }

    /// Hook for domain flags derived from entering a stage.
    fn on_stage_entered(&mut self, _stage: Self::Stage, _now: DateTime<Utc>) {}
}

/// Resolves `name` against a record: `id` and `stage` are answered
/// generically, everything else by [`Record::field`].
pub fn field_value<'a, R: Record>(record: &'a R, name: &str) -> Option<Cow<'a, str>> {
    match name {
        ID_KEY => Some(Cow::Borrowed(record.id())),
        "stage" | "status" => Some(Cow::Owned(record.stage().to_string())),
        _ => record.field(name),
    }
}

use uuid::Uuid;

/// Generates a record id of the form `<prefix>-<uuid v4>`.
pub fn new_record_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

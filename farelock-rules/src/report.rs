use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of running a validator over a draft. An empty error map
/// signals validity. Field keys match the wire field names so that
/// locally computed and authority-rejected errors render the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: BTreeMap<String, String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        // First error per field wins; later rules don't overwrite it
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationReport) {
        for (field, message) in other.errors {
            self.errors.insert(format!("{}.{}", prefix, field), message);
        }
    }
}

//! Normalized result records and attribute payloads.
//!
//! Every data source reports results in the same flat shape: an `id` derived
//! from the remote identity, a `groups` membership list, and all remaining
//! remote attributes flattened into top-level fields.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat attribute-name to value mapping used for payloads and query filters.
pub type AttributeMap = BTreeMap<String, String>;

/// Normalized representation of one remote record.
///
/// Serializes to the flat mapping callers expect: `id` and `groups` alongside
/// every remote attribute as a top-level field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier derived from the remote identity.
    pub id: String,
    /// Group memberships reported by the remote service.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Remaining remote attributes, flattened into top-level fields.
    #[serde(flatten)]
    pub attributes: AttributeMap,
}

impl Record {
    /// Creates a record with the given identifier and no attributes.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            groups: Vec::new(),
            attributes: AttributeMap::new(),
        }
    }

    /// Replaces the attribute mapping.
    #[must_use]
    pub fn with_attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }

    /// Replaces the group membership list.
    #[must_use]
    pub fn with_groups<I>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.groups = groups.into_iter().collect();
        self
    }

    /// Returns the value of a flattened attribute, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns true if the record belongs to the given group (case-insensitive).
    #[must_use]
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g.eq_ignore_ascii_case(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Record {
        let mut attributes = AttributeMap::new();
        attributes.insert("email".to_string(), "a@example.com".to_string());
        attributes.insert("custom:team_id".to_string(), "TEST_PARENT".to_string());

        Record::new("abbott_ryGBVwNMsZ")
            .with_attributes(attributes)
            .with_groups(vec!["admins".to_string()])
    }

    #[test]
    fn record_accessors() {
        let record = sample_record();
        assert_eq!(record.id, "abbott_ryGBVwNMsZ");
        assert_eq!(record.get("email"), Some("a@example.com"));
        assert_eq!(record.get("custom:team_id"), Some("TEST_PARENT"));
        assert!(record.get("missing").is_none());
        assert!(record.in_group("Admins"));
        assert!(!record.in_group("operators"));
    }

    #[test]
    fn record_serializes_flat() {
        let record = sample_record();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], "abbott_ryGBVwNMsZ");
        assert_eq!(json["email"], "a@example.com");
        assert_eq!(json["custom:team_id"], "TEST_PARENT");
        assert_eq!(json["groups"][0], "admins");
        // Attributes must not be nested under a wrapper field.
        assert!(json.get("attributes").is_none());
    }

    #[test]
    fn record_roundtrips_through_json() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}

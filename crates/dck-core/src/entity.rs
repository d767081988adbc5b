//! Entity descriptors naming a remote collection and its key structure.
//!
//! A data source is polymorphic over the entity it operates on: callers hand it
//! anything implementing [`DbEntity`], and the source derives the remote
//! collection, key attributes, and optional index from it. [`EntityDescriptor`]
//! is the plain immutable implementation used by most callers.

use crate::error::{Error, Result};

/// Describes which remote collection and key structure an operation targets.
///
/// Implementations must be immutable: the same descriptor is expected to
/// answer identically for the lifetime of an operation.
pub trait DbEntity: Send + Sync {
    /// Name of the remote collection (user pool, table).
    fn collection_name(&self) -> &str;

    /// Name of the attribute used as the unique identifier.
    fn primary_key(&self) -> &str;

    /// Optional name of a secondary/range attribute.
    fn secondary_key(&self) -> Option<&str>;

    /// Optional name of a secondary index to query through.
    fn index_name(&self) -> Option<&str>;
}

/// Immutable value-object implementation of [`DbEntity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    collection_name: String,
    primary_key: String,
    secondary_key: Option<String>,
    index_name: Option<String>,
}

impl EntityDescriptor {
    /// Creates a descriptor for the given collection and primary key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] when the collection name or primary
    /// key attribute is empty.
    pub fn new(collection_name: impl Into<String>, primary_key: impl Into<String>) -> Result<Self> {
        let collection_name = collection_name.into();
        if collection_name.is_empty() {
            return Err(Error::ValidationError(
                "entity collection name must not be empty".to_string(),
            ));
        }

        let primary_key = primary_key.into();
        if primary_key.is_empty() {
            return Err(Error::ValidationError(
                "entity primary key attribute must not be empty".to_string(),
            ));
        }

        Ok(Self {
            collection_name,
            primary_key,
            secondary_key: None,
            index_name: None,
        })
    }

    /// Sets the secondary/range key attribute name.
    #[must_use]
    pub fn with_secondary_key(mut self, secondary_key: impl Into<String>) -> Self {
        self.secondary_key = Some(secondary_key.into());
        self
    }

    /// Sets the secondary index name.
    #[must_use]
    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }
}

impl DbEntity for EntityDescriptor {
    fn collection_name(&self) -> &str {
        &self.collection_name
    }

    fn primary_key(&self) -> &str {
        &self.primary_key
    }

    fn secondary_key(&self) -> Option<&str> {
        self.secondary_key.as_deref()
    }

    fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_exposes_required_fields() {
        let entity = EntityDescriptor::new("Users", "Username").unwrap();
        assert_eq!(entity.collection_name(), "Users");
        assert_eq!(entity.primary_key(), "Username");
        assert!(entity.secondary_key().is_none());
        assert!(entity.index_name().is_none());
    }

    #[test]
    fn descriptor_builder_sets_optional_fields() {
        let entity = EntityDescriptor::new("Users", "Username")
            .unwrap()
            .with_secondary_key("custom:team_id")
            .with_index_name("team-index");

        assert_eq!(entity.secondary_key(), Some("custom:team_id"));
        assert_eq!(entity.index_name(), Some("team-index"));
    }

    #[test]
    fn descriptor_rejects_empty_collection_name() {
        let result = EntityDescriptor::new("", "Username");
        assert!(matches!(result, Err(Error::ValidationError(_))));
    }

    #[test]
    fn descriptor_rejects_empty_primary_key() {
        let result = EntityDescriptor::new("Users", "");
        assert!(matches!(result, Err(Error::ValidationError(_))));
    }

    #[test]
    fn descriptor_is_usable_as_trait_object() {
        let entity = EntityDescriptor::new("Users", "Username").unwrap();
        let dyn_entity: &dyn DbEntity = &entity;
        assert_eq!(dyn_entity.collection_name(), "Users");
    }
}

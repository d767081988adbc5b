//! The generic asynchronous data-source contract.
//!
//! Concrete adapters translate these five CRUD-shaped operations into calls
//! against a remote service. Each operation resolves exactly once, either with
//! a value or with an [`Error`](crate::Error): the `Result` return is the Rust
//! re-expression of the original `(error, data)` completion callback.

use crate::entity::DbEntity;
use crate::error::Result;
use crate::record::{AttributeMap, Record};
use async_trait::async_trait;

/// Operation input carrying an optional filter or point-lookup query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Attribute-to-matcher mapping. For listings an empty mapping lists all
    /// records; for point lookups it must contain the entity's primary key.
    pub query: AttributeMap,
}

impl QueryOptions {
    /// Creates empty options (list everything / no filter).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query term.
    #[must_use]
    pub fn with_term(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(attribute.into(), value.into());
        self
    }
}

/// Operation input identifying records to delete.
///
/// `keys: None` models an absent key sequence and fails validation;
/// `Some(vec![])` is an explicit empty sequence and succeeds as a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Ordered sequence of key mappings identifying target records.
    pub keys: Option<Vec<AttributeMap>>,
}

impl DeleteOptions {
    /// Creates options from an ordered key sequence.
    #[must_use]
    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = AttributeMap>,
    {
        Self {
            keys: Some(keys.into_iter().collect()),
        }
    }

    /// Creates options with an absent key sequence (fails validation).
    #[must_use]
    pub const fn absent() -> Self {
        Self { keys: None }
    }
}

/// Outcome of a single deletion, one per input key in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Identifier of the deleted record.
    pub id: String,
}

/// Asynchronous CRUD contract over an abstract entity description.
///
/// Implementations are stateless pass-throughs: no retries, no caching, no
/// shared mutable state. Concurrent invocations are independent.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Lists records in the entity's collection, optionally filtered by
    /// `options.query`. An empty query and an absent filter are equivalent.
    async fn get_items(&self, entity: &dyn DbEntity, options: &QueryOptions)
        -> Result<Vec<Record>>;

    /// Fetches the record identified by the entity's primary key in
    /// `options.query`.
    ///
    /// Returns `Ok(None)` when no record matches; this is deliberately a
    /// success, not an error. A missing collection is still an error.
    async fn get_item(
        &self,
        entity: &dyn DbEntity,
        options: &QueryOptions,
    ) -> Result<Option<Record>>;

    /// Creates a record from the supplied attribute mapping and returns the
    /// normalized record including the service-assigned identifier.
    async fn add_item(&self, entity: &dyn DbEntity, attributes: &AttributeMap) -> Result<Record>;

    /// Applies a partial attribute update to the record identified by
    /// `options.query` and returns the updated record.
    async fn update_item(
        &self,
        entity: &dyn DbEntity,
        attributes: &AttributeMap,
        options: &QueryOptions,
    ) -> Result<Record>;

    /// Deletes the records identified by `options.keys`, returning one outcome
    /// per input key in input order.
    async fn delete_items(
        &self,
        entity: &dyn DbEntity,
        options: &DeleteOptions,
    ) -> Result<Vec<DeleteOutcome>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityDescriptor;
    use crate::error::Error;

    struct EmptySource;

    #[async_trait]
    impl DataSource for EmptySource {
        async fn get_items(
            &self,
            _entity: &dyn DbEntity,
            _options: &QueryOptions,
        ) -> Result<Vec<Record>> {
            Ok(Vec::new())
        }

        async fn get_item(
            &self,
            _entity: &dyn DbEntity,
            _options: &QueryOptions,
        ) -> Result<Option<Record>> {
            Ok(None)
        }

        async fn add_item(
            &self,
            _entity: &dyn DbEntity,
            _attributes: &AttributeMap,
        ) -> Result<Record> {
            Err(Error::ResourceNotFound("empty".to_string()))
        }

        async fn update_item(
            &self,
            _entity: &dyn DbEntity,
            _attributes: &AttributeMap,
            _options: &QueryOptions,
        ) -> Result<Record> {
            Err(Error::NotFound("empty".to_string()))
        }

        async fn delete_items(
            &self,
            _entity: &dyn DbEntity,
            _options: &DeleteOptions,
        ) -> Result<Vec<DeleteOutcome>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn contract_is_object_safe() {
        let source: Box<dyn DataSource> = Box::new(EmptySource);
        let entity = EntityDescriptor::new("Users", "Username").unwrap();

        let items = source
            .get_items(&entity, &QueryOptions::new())
            .await
            .unwrap();
        assert!(items.is_empty());

        let item = source.get_item(&entity, &QueryOptions::new()).await.unwrap();
        assert!(item.is_none());
    }

    #[test]
    fn query_options_with_term() {
        let options = QueryOptions::new().with_term("Username", "jdoe");
        assert_eq!(options.query.get("Username").map(String::as_str), Some("jdoe"));
    }

    #[test]
    fn delete_options_constructors() {
        assert!(DeleteOptions::absent().keys.is_none());
        assert_eq!(DeleteOptions::from_keys(Vec::new()).keys, Some(Vec::new()));
        assert_eq!(DeleteOptions::default().keys, None);
    }
}

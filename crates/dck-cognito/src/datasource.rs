//! The user-pool data source.
//!
//! Maps the generic CRUD contract onto the user-pool API: collections are user
//! pools, the primary key attribute addresses usernames, and results are
//! normalized into flat records. Every operation is a stateless round trip (or
//! a small bounded set of them); remote failures surface verbatim, exactly
//! once, with no retries.

use crate::client::{CognitoIdpClient, UserPoolApi};
use crate::config::CognitoConfig;
use crate::user::PoolUser;
use crate::Result;
use async_trait::async_trait;
use dck_core::{
    AttributeMap, DataSource, DbEntity, DeleteOptions, DeleteOutcome, Error, QueryOptions, Record,
};
use tracing::debug;

/// Attribute used to derive an identifier when the primary key is absent from
/// a creation payload.
const FALLBACK_ID_ATTRIBUTE: &str = "email";

/// Data source backed by a user-pool API.
pub struct CognitoDataSource<A: UserPoolApi> {
    api: A,
}

impl CognitoDataSource<CognitoIdpClient> {
    /// Creates a data source speaking the identity-provider protocol over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when the configuration is invalid.
    pub fn from_config(config: &CognitoConfig) -> Result<Self> {
        Ok(Self::new(CognitoIdpClient::from_config(config)?))
    }
}

impl<A: UserPoolApi> CognitoDataSource<A> {
    /// Creates a data source over the given user-pool API.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self { api }
    }
}

#[async_trait]
impl<A: UserPoolApi> DataSource for CognitoDataSource<A> {
    async fn get_items(
        &self,
        entity: &dyn DbEntity,
        options: &QueryOptions,
    ) -> Result<Vec<Record>> {
        let filter = build_filter(&options.query)?;
        debug!(
            collection = entity.collection_name(),
            filtered = filter.is_some(),
            "listing records"
        );

        let users = self
            .api
            .list_users(entity.collection_name(), filter)
            .await?;
        Ok(users.into_iter().map(PoolUser::into_record).collect())
    }

    async fn get_item(
        &self,
        entity: &dyn DbEntity,
        options: &QueryOptions,
    ) -> Result<Option<Record>> {
        let username = lookup_key(entity, &options.query)?;
        debug!(collection = entity.collection_name(), "fetching record");

        match self.api.get_user(entity.collection_name(), &username).await {
            Ok(mut user) => {
                user.groups = self
                    .api
                    .list_groups_for_user(entity.collection_name(), &username)
                    .await?;
                Ok(Some(user.into_record()))
            }
            // Not finding the record is a success; a missing collection stays
            // an error.
            Err(Error::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn add_item(&self, entity: &dyn DbEntity, attributes: &AttributeMap) -> Result<Record> {
        let username = creation_identifier(entity, attributes)?;
        debug!(collection = entity.collection_name(), "creating record");

        let user = self
            .api
            .create_user(entity.collection_name(), &username, attributes)
            .await?;

        let mut record = user.into_record();
        for (name, value) in attributes {
            record
                .attributes
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        Ok(record)
    }

    async fn update_item(
        &self,
        entity: &dyn DbEntity,
        attributes: &AttributeMap,
        options: &QueryOptions,
    ) -> Result<Record> {
        let username = lookup_key(entity, &options.query)?;
        debug!(collection = entity.collection_name(), "updating record");

        self.api
            .update_user_attributes(entity.collection_name(), &username, attributes)
            .await?;

        Ok(Record::new(username).with_attributes(attributes.clone()))
    }

    async fn delete_items(
        &self,
        entity: &dyn DbEntity,
        options: &DeleteOptions,
    ) -> Result<Vec<DeleteOutcome>> {
        let keys = options.keys.as_ref().ok_or_else(|| {
            Error::ValidationError("delete requires a key sequence".to_string())
        })?;

        // Validate the whole sequence before the first remote call.
        let usernames = keys
            .iter()
            .map(|key| lookup_key(entity, key))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            collection = entity.collection_name(),
            count = usernames.len(),
            "deleting records"
        );

        let mut outcomes = Vec::with_capacity(usernames.len());
        for username in usernames {
            self.api
                .delete_user(entity.collection_name(), &username)
                .await?;
            outcomes.push(DeleteOutcome { id: username });
        }
        Ok(outcomes)
    }
}

/// Extracts the primary key value from a point-lookup query.
fn lookup_key(entity: &dyn DbEntity, query: &AttributeMap) -> Result<String> {
    query
        .get(entity.primary_key())
        .filter(|value| !value.is_empty())
        .cloned()
        .ok_or_else(|| {
            Error::ValidationError(format!(
                "query must contain the `{}` key attribute",
                entity.primary_key()
            ))
        })
}

/// Derives the identifier for a creation payload: the entity's primary key
/// attribute when present, otherwise the email-like fallback.
fn creation_identifier(entity: &dyn DbEntity, attributes: &AttributeMap) -> Result<String> {
    attributes
        .get(entity.primary_key())
        .or_else(|| attributes.get(FALLBACK_ID_ATTRIBUTE))
        .filter(|value| !value.is_empty())
        .cloned()
        .ok_or_else(|| {
            Error::ValidationError(format!(
                "attributes must contain `{}` or `{FALLBACK_ID_ATTRIBUTE}` to derive an identifier",
                entity.primary_key()
            ))
        })
}

/// Builds the service-side filter expression from a query mapping.
///
/// The remote filter grammar is single-attribute, so an empty mapping lists
/// everything and more than one term is rejected before any network call.
fn build_filter(query: &AttributeMap) -> Result<Option<String>> {
    let mut terms = query.iter();
    match (terms.next(), terms.next()) {
        (None, _) => Ok(None),
        (Some((attribute, value)), None) => {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            Ok(Some(format!("{attribute} = \"{escaped}\"")))
        }
        (Some(_), Some(_)) => Err(Error::ValidationError(
            "the user pool filter grammar supports a single attribute".to_string(),
        )),
    }
}

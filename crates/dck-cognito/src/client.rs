//! User-pool protocol client and the API seam the data source runs on.
//!
//! The remote protocol is JSON over HTTP: every operation is a `POST` against
//! the endpoint root with an `X-Amz-Target` header naming the operation and an
//! `application/x-amz-json-1.1` body. Failures come back as JSON bodies with a
//! `__type` field which is mapped onto the core error taxonomy.

use crate::config::CognitoConfig;
use crate::user::{
    AttributePair, CreateUserResponse, ListGroupsResponse, ListUsersResponse, PoolUser, UserData,
};
use crate::Result;
use async_trait::async_trait;
use dck_core::{AttributeMap, Error};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = concat!("dck-cognito/", env!("CARGO_PKG_VERSION"));
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const SERVICE_NAME: &str = "cognito-idp";

const POOL_IDLE_TIMEOUT_SECS: u64 = 90;
const POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Capability set the data source depends on.
///
/// Any service exposing an equivalent user/record management API is
/// substitutable behind this trait; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserPoolApi: Send + Sync {
    /// Lists all users in the pool, optionally narrowed by a service-side
    /// filter expression. Follows pagination to exhaustion.
    async fn list_users(&self, pool_id: &str, filter: Option<String>) -> Result<Vec<PoolUser>>;

    /// Fetches a single user by username. Returns [`Error::NotFound`] when the
    /// user does not exist.
    async fn get_user(&self, pool_id: &str, username: &str) -> Result<PoolUser>;

    /// Creates a user with the given username and attribute mapping.
    async fn create_user(
        &self,
        pool_id: &str,
        username: &str,
        attributes: &AttributeMap,
    ) -> Result<PoolUser>;

    /// Applies a partial attribute update to an existing user.
    async fn update_user_attributes(
        &self,
        pool_id: &str,
        username: &str,
        attributes: &AttributeMap,
    ) -> Result<()>;

    /// Deletes a user by username.
    async fn delete_user(&self, pool_id: &str, username: &str) -> Result<()>;

    /// Lists the group names a user belongs to. Follows pagination to
    /// exhaustion.
    async fn list_groups_for_user(&self, pool_id: &str, username: &str) -> Result<Vec<String>>;
}

/// Builder for [`CognitoIdpClient`].
#[derive(Debug, Clone)]
pub struct CognitoIdpClientBuilder {
    config: CognitoConfig,
}

impl CognitoIdpClientBuilder {
    /// Create a new builder from a [`CognitoConfig`].
    #[must_use]
    pub const fn new(config: CognitoConfig) -> Self {
        Self { config }
    }

    /// Finalise the builder and create the [`CognitoIdpClient`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when the endpoint or TLS material is
    /// invalid or the HTTP client cannot be constructed.
    pub fn build(self) -> Result<CognitoIdpClient> {
        let endpoint = self.config.parse_endpoint()?;

        let mut builder = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(self.config.request_timeout())
            .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS))
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .connect_timeout(Duration::from_secs(10));

        if !self.config.tls_verify() {
            warn!("TLS verification disabled for user-pool client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_cert) = self.config.tls_ca_cert() {
            debug!("loading user-pool CA certificate from {}", ca_cert.display());
            let bytes = std::fs::read(ca_cert).map_err(|err| {
                Error::ConfigError(format!(
                    "Failed to read CA certificate {}: {err}",
                    ca_cert.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&bytes)
                .map_err(|err| Error::ConfigError(format!("Invalid CA certificate: {err}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(CognitoIdpClient {
            http,
            endpoint,
            authorization: self.config.authorization().cloned(),
            page_size: self.config.page_size(),
        })
    }
}

/// Asynchronous client for the user-pool identity-provider protocol.
#[derive(Clone)]
pub struct CognitoIdpClient {
    http: Client,
    endpoint: Url,
    authorization: Option<SecretString>,
    page_size: u8,
}

impl CognitoIdpClient {
    /// Construct a client directly from the configuration.
    ///
    /// # Errors
    ///
    /// See [`CognitoIdpClientBuilder::build`].
    pub fn from_config(config: &CognitoConfig) -> Result<Self> {
        CognitoIdpClientBuilder::new(config.clone()).build()
    }

    /// Return the endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post_target<B, R>(&self, target: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let text = self.post_raw(target, body).await?;
        serde_json::from_str::<R>(&text).map_err(|err| {
            Error::ParseError(format!("Failed to parse `{target}` response: {err}"))
        })
    }

    async fn post_target_no_content<B>(&self, target: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.post_raw(target, body).await.map(|_| ())
    }

    async fn post_raw<B>(&self, target: &str, body: &B) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body)
            .map_err(|err| Error::ParseError(format!("Failed to encode `{target}`: {err}")))?;

        let mut request = self
            .http
            .post(self.endpoint.clone())
            .header("Content-Type", CONTENT_TYPE)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{target}"))
            .body(payload);

        if let Some(authorization) = &self.authorization {
            request = request.header("Authorization", authorization.expose_secret());
        }

        debug!(operation = target, "sending user-pool request");

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(map_service_error(status, &text))
        }
    }
}

#[async_trait]
impl UserPoolApi for CognitoIdpClient {
    async fn list_users(&self, pool_id: &str, filter: Option<String>) -> Result<Vec<PoolUser>> {
        let mut users = Vec::new();
        let mut pagination_token: Option<String> = None;

        loop {
            let request = ListUsersRequest {
                user_pool_id: pool_id,
                filter: filter.as_deref(),
                limit: self.page_size,
                pagination_token: pagination_token.as_deref(),
            };

            let page: ListUsersResponse = self.post_target("ListUsers", &request).await?;
            users.extend(page.users.into_iter().map(PoolUser::from));

            match page.pagination_token {
                Some(token) => pagination_token = Some(token),
                None => break,
            }
        }

        Ok(users)
    }

    async fn get_user(&self, pool_id: &str, username: &str) -> Result<PoolUser> {
        let request = UserRequest {
            user_pool_id: pool_id,
            username,
        };
        let data: UserData = self.post_target("AdminGetUser", &request).await?;
        Ok(PoolUser::from(data))
    }

    async fn create_user(
        &self,
        pool_id: &str,
        username: &str,
        attributes: &AttributeMap,
    ) -> Result<PoolUser> {
        let request = CreateUserRequest {
            user_pool_id: pool_id,
            username,
            user_attributes: AttributePair::from_map(attributes),
        };
        let response: CreateUserResponse = self.post_target("AdminCreateUser", &request).await?;
        Ok(PoolUser::from(response.user))
    }

    async fn update_user_attributes(
        &self,
        pool_id: &str,
        username: &str,
        attributes: &AttributeMap,
    ) -> Result<()> {
        let request = UpdateUserAttributesRequest {
            user_pool_id: pool_id,
            username,
            user_attributes: AttributePair::from_map(attributes),
        };
        self.post_target_no_content("AdminUpdateUserAttributes", &request)
            .await
    }

    async fn delete_user(&self, pool_id: &str, username: &str) -> Result<()> {
        let request = UserRequest {
            user_pool_id: pool_id,
            username,
        };
        self.post_target_no_content("AdminDeleteUser", &request)
            .await
    }

    async fn list_groups_for_user(&self, pool_id: &str, username: &str) -> Result<Vec<String>> {
        let mut groups = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let request = ListGroupsForUserRequest {
                user_pool_id: pool_id,
                username,
                limit: self.page_size,
                next_token: next_token.as_deref(),
            };

            let page: ListGroupsResponse =
                self.post_target("AdminListGroupsForUser", &request).await?;
            groups.extend(page.groups.into_iter().map(|group| group.group_name));

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(groups)
    }
}

#[derive(Serialize)]
struct ListUsersRequest<'a> {
    #[serde(rename = "UserPoolId")]
    user_pool_id: &'a str,
    #[serde(rename = "Filter", skip_serializing_if = "Option::is_none")]
    filter: Option<&'a str>,
    #[serde(rename = "Limit")]
    limit: u8,
    #[serde(rename = "PaginationToken", skip_serializing_if = "Option::is_none")]
    pagination_token: Option<&'a str>,
}

#[derive(Serialize)]
struct UserRequest<'a> {
    #[serde(rename = "UserPoolId")]
    user_pool_id: &'a str,
    #[serde(rename = "Username")]
    username: &'a str,
}

#[derive(Serialize)]
struct CreateUserRequest<'a> {
    #[serde(rename = "UserPoolId")]
    user_pool_id: &'a str,
    #[serde(rename = "Username")]
    username: &'a str,
    #[serde(rename = "UserAttributes")]
    user_attributes: Vec<AttributePair>,
}

#[derive(Serialize)]
struct UpdateUserAttributesRequest<'a> {
    #[serde(rename = "UserPoolId")]
    user_pool_id: &'a str,
    #[serde(rename = "Username")]
    username: &'a str,
    #[serde(rename = "UserAttributes")]
    user_attributes: Vec<AttributePair>,
}

#[derive(Serialize)]
struct ListGroupsForUserRequest<'a> {
    #[serde(rename = "UserPoolId")]
    user_pool_id: &'a str,
    #[serde(rename = "Username")]
    username: &'a str,
    #[serde(rename = "Limit")]
    limit: u8,
    #[serde(rename = "NextToken", skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

fn map_service_error(status: StatusCode, body: &str) -> Error {
    let (error_type, message) = parse_error_body(body);

    match error_type.as_deref() {
        Some("UserNotFoundException") => Error::NotFound(message),
        Some("ResourceNotFoundException") => Error::ResourceNotFound(message),
        Some("InvalidParameterException" | "InvalidPasswordException") => {
            Error::InvalidRequest(message)
        }
        Some("UsernameExistsException" | "AliasExistsException") => Error::Conflict(message),
        Some("TooManyRequestsException" | "LimitExceededException") => {
            Error::ServiceUnavailable(message)
        }
        Some("NotAuthorizedException" | "AccessDeniedException") => {
            Error::InvalidRequest(format!("user pool authentication failed: {message}"))
        }
        Some(other) => Error::ExternalServiceError {
            service: SERVICE_NAME.to_string(),
            message: format!("{other}: {message}"),
        },
        None if status.is_server_error() => {
            Error::ServiceUnavailable(format!("user pool server error {status}: {message}"))
        }
        None => Error::HttpError(format!("user pool error {status}: {message}")),
    }
}

fn parse_error_body(body: &str) -> (Option<String>, String) {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return (None, body.to_string());
    };

    // `__type` may be namespaced, e.g. `com.amazonaws...#UserNotFoundException`.
    let error_type = value
        .get("__type")
        .and_then(serde_json::Value::as_str)
        .map(|name| name.rsplit('#').next().unwrap_or(name).to_string());

    let message = value
        .get("message")
        .or_else(|| value.get("Message"))
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| body.to_string(), ToString::to_string);

    (error_type, message)
}

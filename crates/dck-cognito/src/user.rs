//! User-pool wire models and the normalized pool user.
//!
//! The remote service reports users as `{Name, Value}` attribute lists with
//! epoch-seconds timestamps; [`PoolUser`] is the parsed domain form, and
//! [`PoolUser::into_record`] produces the flat [`Record`] shape callers see.

use chrono::{DateTime, Utc};
use dck_core::{AttributeMap, Record};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire-format attribute pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributePair {
    /// Attribute name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Attribute value.
    #[serde(rename = "Value")]
    pub value: String,
}

impl AttributePair {
    /// Creates an attribute pair.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Converts a flat attribute map into a wire-format attribute list.
    #[must_use]
    pub fn from_map(attributes: &AttributeMap) -> Vec<Self> {
        attributes
            .iter()
            .map(|(name, value)| Self::new(name, value))
            .collect()
    }
}

/// One user as reported by the remote service.
///
/// Listing responses carry the attribute list under `Attributes`, point
/// lookups under `UserAttributes`; both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    /// Service-assigned username.
    #[serde(rename = "Username")]
    pub username: String,
    /// Attribute list as reported by listing calls.
    #[serde(rename = "Attributes", default)]
    pub attributes: Vec<AttributePair>,
    /// Attribute list as reported by point lookups.
    #[serde(rename = "UserAttributes", default)]
    pub user_attributes: Vec<AttributePair>,
    /// Whether the account is enabled.
    #[serde(rename = "Enabled", default)]
    pub enabled: Option<bool>,
    /// Account lifecycle status (e.g. `CONFIRMED`, `FORCE_CHANGE_PASSWORD`).
    #[serde(rename = "UserStatus", default)]
    pub status: Option<String>,
    /// Creation time, epoch seconds.
    #[serde(rename = "UserCreateDate", default)]
    pub create_date: Option<f64>,
    /// Last modification time, epoch seconds.
    #[serde(rename = "UserLastModifiedDate", default)]
    pub modified_date: Option<f64>,
}

/// Listing response page.
#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersResponse {
    /// Users on this page.
    #[serde(rename = "Users", default)]
    pub users: Vec<UserData>,
    /// Token for the next page, absent on the last one.
    #[serde(rename = "PaginationToken", default)]
    pub pagination_token: Option<String>,
}

/// Creation response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserResponse {
    /// The created user.
    #[serde(rename = "User")]
    pub user: UserData,
}

/// One group membership entry.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupData {
    /// Group name.
    #[serde(rename = "GroupName")]
    pub group_name: String,
}

/// Group listing response page.
#[derive(Debug, Clone, Deserialize)]
pub struct ListGroupsResponse {
    /// Groups on this page.
    #[serde(rename = "Groups", default)]
    pub groups: Vec<GroupData>,
    /// Token for the next page, absent on the last one.
    #[serde(rename = "NextToken", default)]
    pub next_token: Option<String>,
}

/// Parsed domain form of a remote user.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolUser {
    /// Unique username within the pool.
    pub username: String,
    /// Flat attribute mapping.
    pub attributes: AttributeMap,
    /// Whether the account is enabled.
    pub enabled: bool,
    /// Account lifecycle status.
    pub status: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification timestamp.
    pub updated_at: Option<DateTime<Utc>>,
    /// Group memberships; empty when the call path does not resolve them.
    pub groups: Vec<String>,
}

impl PoolUser {
    /// Returns the service-assigned `sub` attribute parsed as a UUID.
    #[must_use]
    pub fn sub(&self) -> Option<Uuid> {
        self.attributes
            .get("sub")
            .and_then(|value| Uuid::parse_str(value).ok())
    }

    /// Normalizes this user into the flat [`Record`] shape: `id` from the
    /// username, attributes flattened, `groups` always present.
    #[must_use]
    pub fn into_record(self) -> Record {
        Record::new(self.username)
            .with_attributes(self.attributes)
            .with_groups(self.groups)
    }
}

impl From<UserData> for PoolUser {
    fn from(data: UserData) -> Self {
        let pairs = if data.attributes.is_empty() {
            data.user_attributes
        } else {
            data.attributes
        };

        let attributes = pairs
            .into_iter()
            .map(|pair| (pair.name, pair.value))
            .collect::<AttributeMap>();

        Self {
            username: data.username,
            attributes,
            enabled: data.enabled.unwrap_or(true),
            status: data.status,
            created_at: data.create_date.and_then(from_epoch_seconds),
            updated_at: data.modified_date.and_then(from_epoch_seconds),
            groups: Vec::new(),
        }
    }
}

fn from_epoch_seconds(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let secs = value.trunc() as i64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let nanos = (value.fract().abs() * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(secs, nanos)
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::repos::error::RepoError;

/// A member record as the identity store keeps it.
///
/// `nickname` is what the rest of the service calls the display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}

/// The part of a member the gateway cares about: who the caller is.
///
/// Built either from a store lookup or from a verified access token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub display_name: String,
}

impl From<&Member> for Identity {
    fn from(m: &Member) -> Self {
        Self {
            id: m.id,
            username: m.username.clone(),
            display_name: m.nickname.clone(),
        }
    }
}

/// Backing store for members and their API keys.
///
/// - An API key resolves to at most one member.
/// - `rotate_api_key` is the only way a key changes.
/// - Implementations may block on I/O; callers do not retry.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Member>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Member>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Member>, RepoError>;

    async fn find_all(&self) -> Result<Vec<Member>, RepoError>;

    async fn count(&self) -> Result<i64, RepoError>;

    // Create a member with a freshly generated API key.
    //
    // Returns `RepoError::DuplicateUsername` if the username is taken.
    async fn join(&self, username: &str, nickname: &str) -> Result<Member, RepoError>;

    // Replace the member's API key. `Ok(None)` if the member does not exist,
    // `RepoError::DuplicateApiKey` if another member holds the key.
    async fn rotate_api_key(&self, id: i64, api_key: &str) -> Result<Option<Member>, RepoError>;
}

/// New opaque API key (UUID v4, hyphenated).
pub fn generate_api_key() -> String {
    Uuid::new_v4().to_string()
}

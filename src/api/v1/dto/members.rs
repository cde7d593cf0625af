/*
 * Responsibility
 * - Members の request/response DTO
 * - validation (形式チェック) 用の validate()
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::auth::{
    Principal,
    access_control::{classify, is_reserved_username},
};
use crate::services::identity::{Identity, Member};

const USERNAME_MAX_CHARS: usize = 50;
const NICKNAME_MAX_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub username: String,
    pub nickname: String,
}

impl JoinRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err("username is required");
        }
        if username.chars().count() > USERNAME_MAX_CHARS {
            return Err("username must be <= 50 chars");
        }
        // usernames double as dev API keys and show up in Bearer headers
        if username.chars().any(char::is_whitespace) {
            return Err("username must not contain whitespace");
        }
        if is_reserved_username(username) {
            return Err("username is reserved");
        }
        if self.nickname.trim().is_empty() {
            return Err("nickname is required");
        }
        if self.nickname.chars().count() > NICKNAME_MAX_CHARS {
            return Err("nickname must be <= 50 chars");
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub api_key: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.api_key.trim().is_empty() {
            return Err("apiKey is required");
        }
        Ok(())
    }
}

/// The caller as the gateway resolved it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalResponse {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub is_admin: bool,
    pub authorities: Vec<String>,
}

impl From<&Principal> for PrincipalResponse {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id(),
            username: p.username().to_string(),
            display_name: p.display_name().to_string(),
            is_admin: p.is_admin(),
            authorities: p.authorities().iter().cloned().collect(),
        }
    }
}

/// Public view of another member.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: i64,
    pub display_name: String,
}

impl From<Identity> for MemberResponse {
    fn from(i: Identity) -> Self {
        Self {
            id: i.id,
            display_name: i.display_name,
        }
    }
}

/// Admin listing row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmMemberResponse {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Member> for AdmMemberResponse {
    fn from(m: Member) -> Self {
        let is_admin = classify(&Identity::from(&m)).is_admin;
        Self {
            id: m.id,
            username: m.username,
            nickname: m.nickname,
            is_admin,
            created_at: m.created_at,
        }
    }
}

/// Returned by join/login: the credentials the client should keep.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCredentialsResponse {
    pub member: PrincipalResponse,
    pub api_key: String,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join(username: &str, nickname: &str) -> JoinRequest {
        JoinRequest {
            username: username.into(),
            nickname: nickname.into(),
        }
    }

    #[test]
    fn join_validation() {
        assert!(join("user7", "Seven").validate().is_ok());
        assert!(join("", "Seven").validate().is_err());
        assert!(join("user 7", "Seven").validate().is_err());
        assert!(join("user7", "  ").validate().is_err());
        assert!(join(&"u".repeat(51), "Seven").validate().is_err());
    }

    #[test]
    fn admin_usernames_cannot_be_joined() {
        assert_eq!(join("admin", "A").validate(), Err("username is reserved"));
        assert_eq!(join(" system ", "S").validate(), Err("username is reserved"));
        // only the exact names carry admin rights
        assert!(join("Admin", "A").validate().is_ok());
    }

    #[test]
    fn adm_row_flags_admins() {
        let row = AdmMemberResponse::from(Member {
            id: 1,
            username: "system".into(),
            nickname: "System".into(),
            api_key: "system".into(),
            created_at: Utc::now(),
        });
        assert!(row.is_admin);
    }
}

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::access_token::{TokenCodec, TokenIssueError};
use super::credentials::CredentialPair;
use crate::services::identity::Identity;

/// What happened to the access token the caller presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenVerification {
    #[default]
    NotSupplied,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reissue {
    None,
    IssueAndAttach(String),
}

/// Mints a replacement access token when a stale one arrived alongside a good API key.
///
/// Reissues iff a token was supplied, it failed verification, and the API key resolved.
/// Each reissued token is independent; there is no "latest token" bookkeeping.
#[derive(Clone, Debug)]
pub struct ReissuancePolicy {
    codec: Arc<TokenCodec>,
}

impl ReissuancePolicy {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    pub fn should_reissue(
        credentials: &CredentialPair,
        verification: TokenVerification,
        resolved: Option<&Identity>,
    ) -> bool {
        credentials.has_access_token()
            && verification == TokenVerification::Invalid
            && resolved.is_some()
    }

    pub fn decide(
        &self,
        credentials: &CredentialPair,
        verification: TokenVerification,
        resolved: Option<&Identity>,
        now: DateTime<Utc>,
    ) -> Result<Reissue, TokenIssueError> {
        match resolved {
            Some(identity) if Self::should_reissue(credentials, verification, resolved) => {
                let token = self.codec.issue(identity, now)?;
                info!(
                    member_id = identity.id,
                    ttl_seconds = self.codec.ttl_seconds(),
                    "reissued access token"
                );
                Ok(Reissue::IssueAndAttach(token))
            }
            _ => Ok(Reissue::None),
        }
    }
}

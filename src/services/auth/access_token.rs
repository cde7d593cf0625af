use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::identity::Identity;

/// Any verification failure: bad structure, bad signature, unknown fields, expired.
///
/// Carries no cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid access token")]
pub struct InvalidToken;

#[derive(Debug, Error)]
#[error("failed to sign access token: {0}")]
pub struct TokenIssueError(#[from] jsonwebtoken::errors::Error);

/// Access token payload.
///
/// Fixed schema: a token with missing, extra or mistyped fields is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessTokenPayload {
    pub id: i64,
    pub username: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl From<AccessTokenPayload> for Identity {
    fn from(p: AccessTokenPayload) -> Self {
        Self {
            id: p.id,
            username: p.username,
            display_name: p.display_name,
        }
    }
}

/// HS256 access-token issuer/verifier sharing one process-wide secret.
///
/// - Debug omits key material.
/// - Expiry is checked here against the caller-supplied `now` (exclusive upper bound),
///   not by jsonwebtoken's own clock.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a token for `identity` valid for `[now, now + ttl)`.
    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, TokenIssueError> {
        let issued_at = now.timestamp();
        let ttl = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
        let payload = AccessTokenPayload {
            id: identity.id,
            username: identity.username.clone(),
            display_name: identity.display_name.clone(),
            issued_at,
            expires_at: issued_at.saturating_add(ttl),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        Ok(jsonwebtoken::encode(&header, &payload, &self.encoding_key)?)
    }

    /// Verify signature, schema and `now < exp`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AccessTokenPayload, InvalidToken> {
        let data = jsonwebtoken::decode::<AccessTokenPayload>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .map_err(|_| InvalidToken)?;

        let payload = data.claims;
        if now.timestamp() >= payload.expires_at {
            return Err(InvalidToken);
        }

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    const SECRET: &[u8] = b"test-secret-test-secret-test-secret!";
    const TTL: u64 = 1200;

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, TTL)
    }

    fn user1() -> Identity {
        Identity {
            id: 7,
            username: "user1".into(),
            display_name: "User 1".into(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn verify_after_issue_returns_the_identity() {
        let token = codec().issue(&user1(), t0()).unwrap();
        let payload = codec().verify(&token, t0() + Duration::seconds(1)).unwrap();

        assert_eq!(payload.id, 7);
        assert_eq!(payload.username, "user1");
        assert_eq!(payload.display_name, "User 1");
        assert_eq!(payload.issued_at, t0().timestamp());
        assert_eq!(payload.expires_at, t0().timestamp() + TTL as i64);
        assert_eq!(Identity::from(payload), user1());
    }

    #[test]
    fn expiry_is_exclusive() {
        let codec = codec();
        let token = codec.issue(&user1(), t0()).unwrap();
        let ttl = Duration::seconds(TTL as i64);

        assert!(codec.verify(&token, t0() + ttl - Duration::seconds(1)).is_ok());
        assert_eq!(codec.verify(&token, t0() + ttl), Err(InvalidToken));
        assert_eq!(
            codec.verify(&token, t0() + ttl + Duration::seconds(1)),
            Err(InvalidToken)
        );
    }

    #[test]
    fn garbled_and_foreign_tokens_are_invalid() {
        let codec = codec();
        assert_eq!(codec.verify("not-a-token", t0()), Err(InvalidToken));
        assert_eq!(codec.verify("", t0()), Err(InvalidToken));

        let other = TokenCodec::new(b"another-secret-another-secret-xx", TTL);
        let token = other.issue(&user1(), t0()).unwrap();
        assert_eq!(codec.verify(&token, t0()), Err(InvalidToken));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let codec = codec();
        let token = codec.issue(&user1(), t0()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = codec.issue(
            &Identity {
                id: 1,
                username: "admin".into(),
                display_name: "x".into(),
            },
            t0(),
        );
        let forged = forged.unwrap();
        parts[1] = forged.split('.').nth(1).unwrap();

        assert_eq!(codec.verify(&parts.join("."), t0()), Err(InvalidToken));
    }

    #[test]
    fn payload_outside_the_schema_is_invalid() {
        #[derive(Serialize)]
        struct Loose {
            id: i64,
            username: &'static str,
            #[serde(rename = "displayName")]
            display_name: &'static str,
            iat: i64,
            exp: i64,
            role: &'static str,
        }

        let codec = codec();
        let now = t0().timestamp();
        let loose = Loose {
            id: 7,
            username: "user1",
            display_name: "User 1",
            iat: now,
            exp: now + 60,
            role: "admin",
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &loose,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(codec.verify(&token, t0()), Err(InvalidToken));
    }

    #[test]
    fn oversized_ttl_saturates_instead_of_expiring() {
        let codec = TokenCodec::new(SECRET, u64::MAX);
        let token = codec.issue(&user1(), t0()).unwrap();
        let payload = codec.verify(&token, t0() + Duration::days(365)).unwrap();
        assert_eq!(payload.expires_at, i64::MAX);
    }

    #[test]
    fn concurrent_issues_are_independently_valid() {
        let codec = codec();
        let a = codec.issue(&user1(), t0()).unwrap();
        let b = codec.issue(&user1(), t0() + Duration::seconds(5)).unwrap();

        let now = t0() + Duration::seconds(10);
        assert_eq!(codec.verify(&a, now).unwrap().id, 7);
        assert_eq!(codec.verify(&b, now).unwrap().id, 7);
    }
}

//! `(apiKey, accessToken)` extraction from the Authorization header or cookies.

use std::collections::HashMap;

use super::AuthError;
use super::cookie::{ACCESS_TOKEN_COOKIE, API_KEY_COOKIE};

const BEARER_PREFIX: &str = "Bearer ";

/// Raw credentials as the caller sent them. Either side may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPair {
    pub api_key: String,
    pub access_token: String,
}

impl CredentialPair {
    pub fn is_empty(&self) -> bool {
        self.api_key.trim().is_empty() && self.access_token.trim().is_empty()
    }

    pub fn has_access_token(&self) -> bool {
        !self.access_token.trim().is_empty()
    }
}

/// Parse `Bearer <apiKey>[ <accessToken>]`, falling back to cookies when no
/// header is present. A blank header counts as absent.
pub fn extract(
    authorization: Option<&str>,
    cookies: &HashMap<String, String>,
) -> Result<CredentialPair, AuthError> {
    match authorization.filter(|h| !h.trim().is_empty()) {
        Some(header) => {
            if !header.starts_with(BEARER_PREFIX) {
                return Err(AuthError::MalformedCredential);
            }

            // limit 3: anything after the second space stays in the token segment
            let mut bits = header.splitn(3, ' ').skip(1);
            let api_key = bits.next().unwrap_or_default().to_string();
            let access_token = bits.next().unwrap_or_default().to_string();

            Ok(CredentialPair {
                api_key,
                access_token,
            })
        }
        None => {
            let cookie = |name: &str| cookies.get(name).cloned().unwrap_or_default();

            Ok(CredentialPair {
                api_key: cookie(API_KEY_COOKIE),
                access_token: cookie(ACCESS_TOKEN_COOKIE),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_cookies() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn header_with_key_and_token() {
        let pair = extract(Some("Bearer abc123 eyJ.tok.sig"), &no_cookies()).unwrap();
        assert_eq!(pair.api_key, "abc123");
        assert_eq!(pair.access_token, "eyJ.tok.sig");
    }

    #[test]
    fn header_with_key_only() {
        let pair = extract(Some("Bearer abc123"), &no_cookies()).unwrap();
        assert_eq!(pair.api_key, "abc123");
        assert_eq!(pair.access_token, "");
        assert!(!pair.has_access_token());
    }

    #[test]
    fn third_segment_keeps_remaining_spaces() {
        let pair = extract(Some("Bearer k t1 t2"), &no_cookies()).unwrap();
        assert_eq!(pair.access_token, "t1 t2");
    }

    #[test]
    fn non_bearer_header_is_malformed() {
        for header in ["Basic dXNlcjpwYXNz", "bearer abc", "Bearerabc", "Token x"] {
            assert!(
                matches!(
                    extract(Some(header), &no_cookies()),
                    Err(AuthError::MalformedCredential)
                ),
                "{header} should be rejected"
            );
        }
    }

    #[test]
    fn header_wins_over_cookies() {
        let mut cookies = HashMap::new();
        cookies.insert("apiKey".to_string(), "from-cookie".to_string());

        let pair = extract(Some("Bearer from-header"), &cookies).unwrap();
        assert_eq!(pair.api_key, "from-header");
        assert_eq!(pair.access_token, "");
    }

    #[test]
    fn falls_back_to_cookies() {
        let mut cookies = HashMap::new();
        cookies.insert("apiKey".to_string(), "abc123".to_string());
        cookies.insert("accessToken".to_string(), "tok".to_string());

        for header in [None, Some(""), Some("  ")] {
            let pair = extract(header, &cookies).unwrap();
            assert_eq!(pair.api_key, "abc123");
            assert_eq!(pair.access_token, "tok");
        }
    }

    #[test]
    fn nothing_supplied_is_empty() {
        let pair = extract(None, &no_cookies()).unwrap();
        assert!(pair.is_empty());
    }
}

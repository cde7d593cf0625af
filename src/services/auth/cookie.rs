//! Cookie helpers for the `apiKey` / `accessToken` credential cookies.
//!
//! Parsing is lenient (malformed pairs are skipped); building
//! always emits `Path=/; HttpOnly; SameSite=Strict`.

use std::collections::HashMap;

use axum::http::{HeaderMap, HeaderValue, header};

pub const API_KEY_COOKIE: &str = "apiKey";
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Credential cookies outlive the access token itself so that an expired
/// token can still travel back and trigger reissuance.
const CREDENTIAL_COOKIE_MAX_AGE_SECONDS: u64 = 60 * 60 * 24 * 365;

/// Collect every `Cookie` header into a name -> value map. First occurrence wins.
pub fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();

    for raw in headers.get_all(header::COOKIE) {
        let Ok(raw) = raw.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            cookies
                .entry(name.to_string())
                .or_insert_with(|| value.trim().trim_matches('"').to_string());
        }
    }

    cookies
}

/// `Set-Cookie` value carrying a credential. `None` if `value` is not a valid header value.
pub fn credential_cookie(name: &str, value: &str, secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{name}={value}; Path=/; Max-Age={CREDENTIAL_COOKIE_MAX_AGE_SECONDS}; HttpOnly; SameSite=Strict"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// `Set-Cookie` value that removes `name` on the client.
pub fn expired_cookie(name: &str, secure: bool) -> HeaderValue {
    let mut cookie = format!("{name}=; Path=/; Max-Age=0; HttpOnly; SameSite=Strict");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_headers_and_pairs() {
        let mut headers = HeaderMap::new();
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("apiKey=abc123; theme=dark"),
        );
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("accessToken=tok; apiKey=ignored"),
        );

        let cookies = parse_cookies(&headers);
        assert_eq!(cookies.get(API_KEY_COOKIE).map(String::as_str), Some("abc123"));
        assert_eq!(cookies.get(ACCESS_TOKEN_COOKIE).map(String::as_str), Some("tok"));
        assert_eq!(cookies.get("theme").map(String::as_str), Some("dark"));
    }

    #[test]
    fn skips_pairs_without_equals() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("garbage; =x; a=1"));

        let cookies = parse_cookies(&headers);
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn credential_cookie_flags() {
        let plain = credential_cookie(ACCESS_TOKEN_COOKIE, "t", false).unwrap();
        let plain = plain.to_str().unwrap();
        assert!(plain.starts_with("accessToken=t; Path=/;"));
        assert!(plain.contains("HttpOnly"));
        assert!(!plain.contains("Secure"));

        let secure = credential_cookie(API_KEY_COOKIE, "k", true).unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));

        assert!(credential_cookie(API_KEY_COOKIE, "bad\nvalue", false).is_none());
    }

    #[test]
    fn expired_cookie_has_zero_max_age() {
        let v = expired_cookie(API_KEY_COOKIE, false);
        assert!(v.to_str().unwrap().contains("Max-Age=0"));
    }
}

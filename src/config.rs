/*
 * Responsibility
 * - 環境変数の読み込み (PORT, DATABASE_URL, 署名 secret, token TTL など)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// HS256 secrets shorter than this are rejected at startup.
const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // None -> in-memory identity store
    pub database_url: Option<String>,

    pub access_token_secret: String,
    pub access_token_ttl_seconds: u64,

    pub cookie_secure: bool,
    pub seed_dev_members: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the signing secret or DB credentials
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database", &self.database_url.is_some())
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("cookie_secure", &self.cookie_secure)
            .field("seed_dev_members", &self.seed_dev_members)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let access_token_secret = std::env::var("ACCESS_TOKEN_SECRET")
            .map_err(|_| ConfigError::Missing("ACCESS_TOKEN_SECRET"))?;
        validate_secret(&access_token_secret)?;

        let access_token_ttl_seconds = parse_ttl(std::env::var("ACCESS_TOKEN_TTL_SECONDS").ok())?;

        let cookie_secure = parse_flag(std::env::var("COOKIE_SECURE").ok())
            .unwrap_or_else(|| app_env.is_production());

        let seed_dev_members = parse_flag(std::env::var("SEED_DEV_MEMBERS").ok())
            .unwrap_or_else(|| !app_env.is_production())
            && !app_env.is_production();

        Ok(Self {
            addr,
            app_env,
            database_url,
            access_token_secret,
            access_token_ttl_seconds,
            cookie_secure,
            seed_dev_members,
        })
    }
}

fn validate_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_BYTES {
        return Err(ConfigError::Invalid("ACCESS_TOKEN_SECRET"));
    }
    Ok(())
}

fn parse_ttl(raw: Option<String>) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(1200), // 20 min
        // exp is an i64 timestamp, so the TTL must fit in one
        Some(v) => match v.trim().parse::<i64>() {
            Ok(n) if n > 0 => Ok(n as u64),
            _ => Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS")),
        },
    }
}

fn parse_flag(raw: Option<String>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_accepts_prod_aliases() {
        assert_eq!(AppEnv::parse("PROD"), AppEnv::Production);
        assert_eq!(AppEnv::parse("production"), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Development);
    }

    #[test]
    fn short_secret_is_rejected() {
        assert_eq!(
            validate_secret("too-short"),
            Err(ConfigError::Invalid("ACCESS_TOKEN_SECRET"))
        );
        assert!(validate_secret(&"x".repeat(MIN_SECRET_BYTES)).is_ok());
    }

    #[test]
    fn ttl_defaults_and_rejects_zero() {
        assert_eq!(parse_ttl(None), Ok(1200));
        assert_eq!(parse_ttl(Some("60".into())), Ok(60));
        assert!(parse_ttl(Some("0".into())).is_err());
        assert!(parse_ttl(Some("soon".into())).is_err());
        assert!(parse_ttl(Some("-5".into())).is_err());
        assert!(parse_ttl(Some(u64::MAX.to_string())).is_err());
        assert_eq!(
            parse_ttl(Some(i64::MAX.to_string())),
            Ok(i64::MAX as u64)
        );
    }

    #[test]
    fn flags_parse_common_spellings() {
        assert_eq!(parse_flag(Some("TRUE".into())), Some(true));
        assert_eq!(parse_flag(Some("off".into())), Some(false));
        assert_eq!(parse_flag(Some("maybe".into())), None);
        assert_eq!(parse_flag(None), None);
    }
}

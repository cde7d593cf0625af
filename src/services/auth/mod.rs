pub mod access_control;
pub mod access_token;
pub mod cookie;
pub mod credentials;
pub mod factory;
pub mod pipeline;
pub mod principal;
pub mod reissue;

use thiserror::Error;

use crate::repos::error::RepoError;

pub use access_token::{TokenCodec, TokenIssueError};
pub use factory::{build_gateway, build_token_codec};
pub use pipeline::{AuthGateway, RequestView};
pub use principal::Principal;

/// Terminal outcomes of the auth gateway.
///
/// An invalid access token is not listed: it only sends the gateway down the
/// API key path.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization header is not in Bearer format.")]
    MalformedCredential,

    #[error("API key is not valid.")]
    UnresolvableApiKey,

    #[error("identity store failure: {0}")]
    Store(#[from] RepoError),

    #[error(transparent)]
    TokenIssue(#[from] TokenIssueError),
}

impl AuthError {
    pub fn result_code(&self) -> &'static str {
        match self {
            AuthError::MalformedCredential => "401-2",
            AuthError::UnresolvableApiKey => "401-3",
            AuthError::Store(_) | AuthError::TokenIssue(_) => "500-1",
        }
    }
}

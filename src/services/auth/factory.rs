/// Factory: build the token codec and gateway from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{AuthGateway, TokenCodec};
use crate::services::identity::{IdentityResolver, IdentityStore};

pub fn build_token_codec(config: &Config) -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(
        config.access_token_secret.as_bytes(),
        config.access_token_ttl_seconds,
    ))
}

pub fn build_gateway(codec: Arc<TokenCodec>, store: Arc<dyn IdentityStore>) -> Arc<AuthGateway> {
    Arc::new(AuthGateway::new(codec, IdentityResolver::new(store)))
}

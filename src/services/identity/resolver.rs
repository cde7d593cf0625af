use std::sync::Arc;

use tracing::debug;

use super::store::{Identity, IdentityStore};
use crate::repos::error::RepoError;

/// Looks callers up in the injected identity store.
///
/// Blank keys short-circuit to `None` without touching the store.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn IdentityStore>,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Identity>, RepoError> {
        if api_key.trim().is_empty() {
            return Ok(None);
        }

        let member = self.store.find_by_api_key(api_key).await?;
        debug!(
            backend = self.store.backend_name(),
            found = member.is_some(),
            "api key lookup"
        );

        Ok(member.as_ref().map(Identity::from))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, RepoError> {
        let member = self.store.find_by_id(id).await?;
        Ok(member.as_ref().map(Identity::from))
    }
}

use tracing::{info, warn};

use super::store::IdentityStore;
use crate::repos::error::RepoError;

/// Development members. Each one's API key is its username so local
/// requests can use `Authorization: Bearer user1`.
const DEV_MEMBERS: &[(&str, &str)] = &[
    ("system", "System"),
    ("admin", "Administrator"),
    ("user1", "User 1"),
    ("user2", "User 2"),
    ("user3", "User 3"),
    ("user4", "User 4"),
    ("user5", "User 5"),
    ("user6", "User 6"),
];

/// Seed development members into an empty store. No-op otherwise.
///
/// Returns the number of members whose API key was set to their username.
pub async fn seed_dev_members(store: &dyn IdentityStore) -> Result<usize, RepoError> {
    if store.count().await? > 0 {
        return Ok(0);
    }

    let mut seeded = 0;
    for (username, nickname) in DEV_MEMBERS {
        let member = store.join(username, nickname).await?;
        if store.rotate_api_key(member.id, username).await?.is_some() {
            seeded += 1;
        } else {
            warn!(member_id = member.id, username, "seeded member kept its generated api key");
        }
    }

    info!(
        backend = store.backend_name(),
        members = seeded,
        "seeded development members"
    );
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::repos::memory_member_store::InMemoryMemberStore;
    use crate::services::identity::Member;

    #[tokio::test]
    async fn seeds_once_with_username_keys() {
        let store = InMemoryMemberStore::new();

        assert_eq!(seed_dev_members(&store).await.unwrap(), DEV_MEMBERS.len());
        assert_eq!(seed_dev_members(&store).await.unwrap(), 0);

        let admin = store.find_by_api_key("admin").await.unwrap().unwrap();
        assert_eq!(admin.username, "admin");
        assert_eq!(store.count().await.unwrap(), DEV_MEMBERS.len() as i64);
    }

    /// Joins normally but never lets a key change.
    struct FrozenKeys(InMemoryMemberStore);

    #[async_trait]
    impl IdentityStore for FrozenKeys {
        fn backend_name(&self) -> &'static str {
            "frozen"
        }

        async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Member>, RepoError> {
            self.0.find_by_api_key(api_key).await
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Member>, RepoError> {
            self.0.find_by_id(id).await
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<Member>, RepoError> {
            self.0.find_by_username(username).await
        }

        async fn find_all(&self) -> Result<Vec<Member>, RepoError> {
            self.0.find_all().await
        }

        async fn count(&self) -> Result<i64, RepoError> {
            self.0.count().await
        }

        async fn join(&self, username: &str, nickname: &str) -> Result<Member, RepoError> {
            self.0.join(username, nickname).await
        }

        async fn rotate_api_key(
            &self,
            _id: i64,
            _api_key: &str,
        ) -> Result<Option<Member>, RepoError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn unrotated_members_are_not_counted_as_seeded() {
        let store = FrozenKeys(InMemoryMemberStore::new());

        assert_eq!(seed_dev_members(&store).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), DEV_MEMBERS.len() as i64);
        assert!(store.find_by_api_key("admin").await.unwrap().is_none());
    }
}

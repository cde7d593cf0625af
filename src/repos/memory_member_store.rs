/*
 * Responsibility
 * - DATABASE_URL 未設定時 / テスト用の in-memory IdentityStore
 * - 制約 (username / api_key の一意性) は Postgres 実装と揃える
 */
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repos::error::RepoError;
use crate::services::identity::{IdentityStore, Member, generate_api_key};

#[derive(Debug, Default)]
struct Inner {
    members: Vec<Member>,
    next_id: i64,
}

#[derive(Debug, Default)]
pub struct InMemoryMemberStore {
    inner: RwLock<Inner>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for InMemoryMemberStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Member>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner.members.iter().find(|m| m.api_key == api_key).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Member>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner.members.iter().find(|m| m.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Member>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner.members.iter().find(|m| m.username == username).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Member>, RepoError> {
        Ok(self.inner.read().await.members.clone())
    }

    async fn count(&self) -> Result<i64, RepoError> {
        Ok(self.inner.read().await.members.len() as i64)
    }

    async fn join(&self, username: &str, nickname: &str) -> Result<Member, RepoError> {
        let mut inner = self.inner.write().await;
        if inner.members.iter().any(|m| m.username == username) {
            return Err(RepoError::DuplicateUsername);
        }

        inner.next_id += 1;
        let member = Member {
            id: inner.next_id,
            username: username.to_string(),
            nickname: nickname.to_string(),
            api_key: generate_api_key(),
            created_at: Utc::now(),
        };
        inner.members.push(member.clone());

        Ok(member)
    }

    async fn rotate_api_key(&self, id: i64, api_key: &str) -> Result<Option<Member>, RepoError> {
        let mut inner = self.inner.write().await;

        // Keys stay 1:1 with members; mirrors members_api_key_key.
        if inner
            .members
            .iter()
            .any(|m| m.id != id && m.api_key == api_key)
        {
            return Err(RepoError::DuplicateApiKey);
        }

        let Some(member) = inner.members.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        member.api_key = api_key.to_string();

        Ok(Some(member.clone()))
    }
}

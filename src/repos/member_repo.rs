/*
 * Responsibility
 * - members テーブル向け SQLx 操作
 * - PgPool を受け取り lookup / join / api key rotation を提供
 * - IdentityStore trait の Postgres 実装
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;
use crate::services::identity::{IdentityStore, Member, generate_api_key};

#[derive(Debug, FromRow)]
pub struct MemberRow {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}

impl From<MemberRow> for Member {
    fn from(r: MemberRow) -> Self {
        Self {
            id: r.id,
            username: r.username,
            nickname: r.nickname,
            api_key: r.api_key,
            created_at: r.created_at,
        }
    }
}

pub async fn ensure_schema(db: &PgPool) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id          BIGSERIAL PRIMARY KEY,
            username    TEXT NOT NULL CONSTRAINT members_username_key UNIQUE,
            nickname    TEXT NOT NULL,
            api_key     TEXT NOT NULL CONSTRAINT members_api_key_key UNIQUE,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(db)
    .await?;

    Ok(())
}

pub async fn find_by_api_key(db: &PgPool, api_key: &str) -> Result<Option<MemberRow>, RepoError> {
    let row = sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT id, username, nickname, api_key, created_at
        FROM members
        WHERE api_key = $1
        "#,
    )
    .bind(api_key)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<MemberRow>, RepoError> {
    let row = sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT id, username, nickname, api_key, created_at
        FROM members
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn find_by_username(
    db: &PgPool,
    username: &str,
) -> Result<Option<MemberRow>, RepoError> {
    let row = sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT id, username, nickname, api_key, created_at
        FROM members
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn list(db: &PgPool) -> Result<Vec<MemberRow>, RepoError> {
    let rows = sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT id, username, nickname, api_key, created_at
        FROM members
        ORDER BY id ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn count(db: &PgPool) -> Result<i64, RepoError> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM members")
        .fetch_one(db)
        .await?;

    Ok(n)
}

pub async fn create(
    db: &PgPool,
    username: &str,
    nickname: &str,
    api_key: &str,
) -> Result<MemberRow, RepoError> {
    let row = sqlx::query_as::<_, MemberRow>(
        r#"
        INSERT INTO members (username, nickname, api_key)
        VALUES ($1, $2, $3)
        RETURNING id, username, nickname, api_key, created_at
        "#,
    )
    .bind(username)
    .bind(nickname)
    .bind(api_key)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

pub async fn update_api_key(
    db: &PgPool,
    id: i64,
    api_key: &str,
) -> Result<Option<MemberRow>, RepoError> {
    let row = sqlx::query_as::<_, MemberRow>(
        r#"
        UPDATE members
        SET api_key = $2
        WHERE id = $1
        RETURNING id, username, nickname, api_key, created_at
        "#,
    )
    .bind(id)
    .bind(api_key)
    .fetch_optional(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}

/// Postgres-backed identity store.
#[derive(Clone, Debug)]
pub struct PgMemberRepo {
    db: PgPool,
}

impl PgMemberRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityStore for PgMemberRepo {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Member>, RepoError> {
        Ok(find_by_api_key(&self.db, api_key).await?.map(Member::from))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Member>, RepoError> {
        Ok(find_by_id(&self.db, id).await?.map(Member::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Member>, RepoError> {
        Ok(find_by_username(&self.db, username)
            .await?
            .map(Member::from))
    }

    async fn find_all(&self) -> Result<Vec<Member>, RepoError> {
        Ok(list(&self.db).await?.into_iter().map(Member::from).collect())
    }

    async fn count(&self) -> Result<i64, RepoError> {
        count(&self.db).await
    }

    async fn join(&self, username: &str, nickname: &str) -> Result<Member, RepoError> {
        create(&self.db, username, nickname, &generate_api_key())
            .await
            .map(Member::from)
    }

    async fn rotate_api_key(&self, id: i64, api_key: &str) -> Result<Option<Member>, RepoError> {
        Ok(update_api_key(&self.db, id, api_key)
            .await?
            .map(Member::from))
    }
}

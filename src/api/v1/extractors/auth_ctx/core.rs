use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::{Principal, access_control::ROLE_ADMIN};
use crate::state::AppState;

use super::AuthCtx;

/// Handler で AuthCtx を受け取るための extractor (匿名も許可)
///
/// gateway middleware が AuthCtx を request.extensions() に insert 済みである前提。
/// 見つからない場合 (middleware 未設定) は Anonymous として扱う。
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(AuthCtxExtractor(
            parts
                .extensions
                .get::<AuthCtx>()
                .cloned()
                .unwrap_or(AuthCtx::Anonymous),
        ))
    }
}

/// ログイン済みメンバーを要求する extractor。匿名なら 401-1。
pub struct Actor(pub Principal);

impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthCtx>() {
            Some(AuthCtx::Member(p)) => Ok(Actor(p.clone())),
            _ => Err(AppError::login_required()),
        }
    }
}

/// 管理者 (ROLE_ADMIN) を要求する extractor。匿名なら 401-1、一般メンバーなら 403-1。
pub struct AdminActor(pub Principal);

impl FromRequestParts<AppState> for AdminActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Actor(principal) = Actor::from_request_parts(parts, state).await?;
        if !principal.has_authority(ROLE_ADMIN) {
            return Err(AppError::forbidden("403-1", "Admin privileges are required."));
        }
        Ok(AdminActor(principal))
    }
}

//! 認証ゲートウェイ → AuthCtx を extensions に入れる
//!
//! - `AuthGateway::run` で credential 抽出 / 検証 / API key fallback / 再発行判定まで行う
//! - 失敗 (401-2 / 401-3 / 500-1) は AppError としてそのまま返し、handler は呼ばない
//! - 再発行された access token は response に付与する:
//!   - `Set-Cookie: accessToken=<token>`
//!   - `Authorization: <token>` (request 側と違い `Bearer` prefix は付けない)

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderValue, Request, header},
    middleware::{self, Next},
    response::Response,
};
use chrono::Utc;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::RequestView;
use crate::services::auth::cookie::{ACCESS_TOKEN_COOKIE, credential_cookie};
use crate::state::AppState;

/// Router 全体に gateway を掛ける。
///
/// path 判定 (bypass / `/api/` prefix) にはフルパスが必要なので、`nest` 後の
/// トップレベル Router に適用すること。
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let outcome = {
        let view = RequestView {
            path: req.uri().path(),
            headers: req.headers(),
        };
        state.gateway.run(view, Utc::now()).await?
    };

    // middleware → extractor への受け渡し
    req.extensions_mut()
        .insert(AuthCtx::from_principal(outcome.principal));

    let mut response = next.run(req).await;

    if let Some(token) = outcome.reissued_token {
        attach_reissued_token(response.headers_mut(), &token, state.cookie_secure);
    }

    Ok(response)
}

fn attach_reissued_token(headers: &mut HeaderMap, token: &str, cookie_secure: bool) {
    match (
        credential_cookie(ACCESS_TOKEN_COOKIE, token, cookie_secure),
        HeaderValue::from_str(token),
    ) {
        (Some(cookie), Ok(raw)) => {
            headers.append(header::SET_COOKIE, cookie);
            headers.insert(header::AUTHORIZATION, raw);
        }
        _ => tracing::error!("reissued access token is not a valid header value"),
    }
}

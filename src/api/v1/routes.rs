/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /members, /adm/members
 * - 認証 (gateway) は app.rs でトップレベルに掛ける。ここでは掛けない
 *   (bypass 判定がフルパス前提のため)
 */
use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::members::{
    adm_list_members, get_member, join, login, logout, me, rotate_api_key,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/members/join", post(join))
        .route("/members/login", post(login))
        .route("/members/logout", delete(logout))
        .route("/members/me", get(me))
        .route("/members/me/apiKey", post(rotate_api_key))
        .route("/members/{id}", get(get_member))
        .route("/adm/members", get(adm_list_members))
}

/*
 * Responsibility
 * - /members 系 handler (join / login / logout / me / api key rotation / 参照)
 * - /adm/members (管理者のみ)
 * - 認証は gateway middleware 済み。handler は AuthCtx / Actor を受け取るだけ
 */
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
};
use chrono::Utc;
use tracing::{debug, info};

use crate::{
    api::v1::{
        dto::{
            RsData,
            members::{
                AdmMemberResponse, ApiKeyResponse, JoinRequest, LoginRequest, MemberResponse,
                PrincipalResponse, SessionCredentialsResponse,
            },
        },
        extractors::{Actor, AdminActor, AuthCtxExtractor},
    },
    error::AppError,
    repos::error::RepoError,
    services::{
        auth::{
            AuthError, Principal,
            cookie::{ACCESS_TOKEN_COOKIE, API_KEY_COOKIE, credential_cookie, expired_cookie},
        },
        identity::{Identity, generate_api_key},
    },
    state::AppState,
};

pub async fn join(
    State(state): State<AppState>,
    Json(req): Json<JoinRequest>,
) -> Result<(StatusCode, HeaderMap, Json<RsData<SessionCredentialsResponse>>), AppError> {
    req.validate().map_err(|msg| AppError::bad_request("400-1", msg))?;

    let username = req.username.trim();
    if state.members.find_by_username(username).await?.is_some() {
        return Err(AppError::from(RepoError::DuplicateUsername));
    }

    // the unique constraint still catches a concurrent join
    let member = state.members.join(username, req.nickname.trim()).await?;
    info!(member_id = member.id, "member joined");

    let identity = Identity::from(&member);
    let (headers, body) = open_session(&state, identity, member.api_key)?;

    Ok((
        StatusCode::CREATED,
        headers,
        Json(RsData::new(
            "201-1",
            format!("Welcome, {}.", member.nickname),
            body,
        )),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<RsData<SessionCredentialsResponse>>), AppError> {
    req.validate().map_err(|msg| AppError::bad_request("400-1", msg))?;

    let identity = state
        .gateway
        .resolver()
        .find_by_api_key(&req.api_key)
        .await
        .map_err(AuthError::from)?
        .ok_or(AuthError::UnresolvableApiKey)?;

    let (headers, body) = open_session(&state, identity, req.api_key)?;
    let msg = format!("Logged in as {}.", body.member.display_name);

    Ok((headers, Json(RsData::new("200-1", msg, body))))
}

pub async fn logout(State(state): State<AppState>) -> (HeaderMap, Json<RsData<()>>) {
    let mut headers = HeaderMap::new();
    for name in [API_KEY_COOKIE, ACCESS_TOKEN_COOKIE] {
        headers.append(header::SET_COOKIE, expired_cookie(name, state.cookie_secure));
    }

    (headers, Json(RsData::message("200-1", "Logged out.")))
}

pub async fn me(Actor(principal): Actor) -> Json<PrincipalResponse> {
    Json(PrincipalResponse::from(&principal))
}

pub async fn rotate_api_key(
    State(state): State<AppState>,
    Actor(principal): Actor,
) -> Result<(HeaderMap, Json<RsData<ApiKeyResponse>>), AppError> {
    let api_key = generate_api_key();
    let member = state
        .members
        .rotate_api_key(principal.id(), &api_key)
        .await?
        .ok_or_else(|| AppError::not_found("404-1", "Member not found."))?;
    info!(member_id = member.id, "api key rotated");

    let mut headers = HeaderMap::new();
    if let Some(cookie) = credential_cookie(API_KEY_COOKIE, &member.api_key, state.cookie_secure) {
        headers.append(header::SET_COOKIE, cookie);
    }

    Ok((
        headers,
        Json(RsData::new(
            "200-1",
            "API key rotated.",
            ApiKeyResponse {
                api_key: member.api_key,
            },
        )),
    ))
}

pub async fn get_member(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(id): Path<i64>,
) -> Result<Json<MemberResponse>, AppError> {
    debug!(member_id = id, viewer = ?ctx.principal().map(Principal::id), "member lookup");
    let identity = state
        .gateway
        .resolver()
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("404-1", "Member not found."))?;

    Ok(Json(MemberResponse::from(identity)))
}

pub async fn adm_list_members(
    State(state): State<AppState>,
    AdminActor(_admin): AdminActor,
) -> Result<Json<Vec<AdmMemberResponse>>, AppError> {
    let members = state.members.find_all().await?;

    Ok(Json(members.into_iter().map(AdmMemberResponse::from).collect()))
}

/// Issue an access token and the cookies that carry both credentials.
fn open_session(
    state: &AppState,
    identity: Identity,
    api_key: String,
) -> Result<(HeaderMap, SessionCredentialsResponse), AppError> {
    let access_token = state
        .gateway
        .codec()
        .issue(&identity, Utc::now())
        .map_err(AuthError::from)?;

    let mut headers = HeaderMap::new();
    for (name, value) in [
        (API_KEY_COOKIE, api_key.as_str()),
        (ACCESS_TOKEN_COOKIE, access_token.as_str()),
    ] {
        if let Some(cookie) = credential_cookie(name, value, state.cookie_secure) {
            headers.append(header::SET_COOKIE, cookie);
        }
    }

    let principal = Principal::from_identity(identity);

    Ok((
        headers,
        SessionCredentialsResponse {
            member: PrincipalResponse::from(&principal),
            api_key,
            access_token,
        },
    ))
}

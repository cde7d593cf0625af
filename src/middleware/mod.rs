/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: 認証ゲートウェイ (API key / access token)
 * - http: request id / body limit / timeout / access log
 */
pub mod auth;
pub mod http;

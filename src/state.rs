/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - gateway: 認証ゲートウェイ (token codec + identity resolver)
 *   - members: IdentityStore (Postgres or in-memory)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - リクエスト間で共有される可変状態は持たない
 */
use std::sync::Arc;

use crate::services::{auth::AuthGateway, identity::IdentityStore};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<AuthGateway>,
    pub members: Arc<dyn IdentityStore>,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(gateway: Arc<AuthGateway>, members: Arc<dyn IdentityStore>, cookie_secure: bool) -> Self {
        Self {
            gateway,
            members,
            cookie_secure,
        }
    }
}

/*
 * Responsibility
 * - Handler から見える「認証コンテキスト」の型
 * - gateway middleware が request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - credential の検証・再発行は middleware/services 側の責務
 * - 匿名アクセスも 1 つの状態として表現する (bypass path / credential なし)
 */
use crate::services::auth::Principal;

/// 認証ゲートウェイを通過したリクエストに付与されるコンテキスト
///
/// - `Anonymous`: bypass path、または credential が一切無かった
/// - `Member`: API key か access token で解決された Principal (リクエスト単位のスナップショット)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCtx {
    Anonymous,
    Member(Principal),
}

impl AuthCtx {
    pub fn from_principal(principal: Option<Principal>) -> Self {
        principal.map_or(Self::Anonymous, Self::Member)
    }

    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Member(p) => Some(p),
            Self::Anonymous => None,
        }
    }
}

/*!
 * Authentication context extractors
 *
 * Responsibility:
 * - gateway が解決した認証コンテキスト（AuthCtx）を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor / Actor / AdminActor
 */

mod core;
mod types;

pub use core::{Actor, AdminActor, AuthCtxExtractor};
pub use types::AuthCtx;

/*
 * Responsibility
 * - 永続化層 (members テーブル / in-memory 実装)
 */
pub mod error;
pub mod member_repo;
pub mod memory_member_store;

pub mod auth_ctx;

pub use auth_ctx::{Actor, AdminActor, AuthCtx, AuthCtxExtractor};

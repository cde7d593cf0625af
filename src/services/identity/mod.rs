//! Identity store seam + resolver used by the auth gateway.
//!
//! The store is an injected collaborator (`Arc<dyn IdentityStore>` in `AppState`);
//! nothing in the gateway reaches it through a global.

mod resolver;
mod seed;
mod store;

pub use resolver::IdentityResolver;
pub use seed::seed_dev_members;
pub use store::{Identity, IdentityStore, Member, generate_api_key};

use std::collections::BTreeSet;

use super::access_control::classify;
use crate::services::identity::Identity;

/// The resolved caller for one request.
///
/// Authorities are computed once at construction; there is no setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    id: i64,
    username: String,
    display_name: String,
    is_admin: bool,
    authorities: BTreeSet<String>,
}

impl Principal {
    pub fn from_identity(identity: Identity) -> Self {
        let classification = classify(&identity);

        Self {
            id: identity.id,
            username: identity.username,
            display_name: identity.display_name,
            is_admin: classification.is_admin,
            authorities: classification.authorities,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::access_control::ROLE_ADMIN;

    #[test]
    fn admin_snapshot_carries_role() {
        let p = Principal::from_identity(Identity {
            id: 2,
            username: "admin".into(),
            display_name: "Administrator".into(),
        });
        assert!(p.is_admin());
        assert!(p.has_authority(ROLE_ADMIN));
        assert_eq!(p.display_name(), "Administrator");
    }

    #[test]
    fn member_snapshot_has_no_authorities() {
        let p = Principal::from_identity(Identity {
            id: 7,
            username: "user1".into(),
            display_name: "User 1".into(),
        });
        assert_eq!(p.id(), 7);
        assert!(!p.is_admin());
        assert!(p.authorities().is_empty());
    }
}

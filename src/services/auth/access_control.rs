//! Admin inference and route bypass. Both are fixed policy, not configuration.

use std::collections::BTreeSet;

use crate::services::identity::Identity;

pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Exact, case-sensitive matches only.
const ADMIN_USERNAMES: [&str; 2] = ["system", "admin"];

/// Everything outside this prefix is reachable anonymously.
const PROTECTED_PREFIX: &str = "/api/";

const BYPASS_PATHS: [&str; 3] = [
    "/api/v1/members/login",
    "/api/v1/members/logout",
    "/api/v1/members/join",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub is_admin: bool,
    pub authorities: BTreeSet<String>,
}

pub fn classify(identity: &Identity) -> Classification {
    let is_admin = is_reserved_username(&identity.username);

    let mut authorities = BTreeSet::new();
    if is_admin {
        authorities.insert(ROLE_ADMIN.to_string());
    }

    Classification {
        is_admin,
        authorities,
    }
}

/// Usernames that carry admin rights and so cannot be claimed through join.
pub fn is_reserved_username(username: &str) -> bool {
    ADMIN_USERNAMES.contains(&username)
}

/// `true` when the gateway should not look at credentials at all.
pub fn route_bypass(path: &str) -> bool {
    !path.starts_with(PROTECTED_PREFIX) || BYPASS_PATHS.contains(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(username: &str) -> Identity {
        Identity {
            id: 1,
            username: username.into(),
            display_name: username.into(),
        }
    }

    #[test]
    fn admin_is_exactly_system_or_admin() {
        for username in ["system", "admin"] {
            let c = classify(&named(username));
            assert!(c.is_admin, "{username}");
            assert_eq!(c.authorities, BTreeSet::from([ROLE_ADMIN.to_string()]));
        }

        for username in ["Admin", "ADMIN", "System", "admin ", " admin", "administrator", "user1", ""] {
            let c = classify(&named(username));
            assert!(!c.is_admin, "{username:?}");
            assert!(c.authorities.is_empty());
        }
    }

    #[test]
    fn allow_list_and_outside_prefix_bypass() {
        assert!(route_bypass("/api/v1/members/login"));
        assert!(route_bypass("/api/v1/members/logout"));
        assert!(route_bypass("/api/v1/members/join"));
        assert!(route_bypass("/health"));
        assert!(route_bypass("/"));
        assert!(route_bypass("/apix/v1/members"));
    }

    #[test]
    fn protected_paths_do_not_bypass() {
        assert!(!route_bypass("/api/v1/members/me"));
        assert!(!route_bypass("/api/v1/members/login/extra"));
        assert!(!route_bypass("/api/v1/adm/members"));
        assert!(!route_bypass("/api/"));
    }
}

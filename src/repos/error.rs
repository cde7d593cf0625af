/**
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("duplicate username")]
    DuplicateUsername,
    #[error("api key already in use")]
    DuplicateApiKey,
}

impl RepoError {
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
            && let Some(constraint) = dbe.constraint()
            && let Some(mapped) = Self::from_unique_constraint(constraint)
        {
            return mapped;
        }
        RepoError::Db(e)
    }

    // members_username_key / members_api_key_key
    fn from_unique_constraint(constraint: &str) -> Option<Self> {
        if constraint.contains("username") {
            Some(RepoError::DuplicateUsername)
        } else if constraint.contains("api_key") {
            Some(RepoError::DuplicateApiKey)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_constraints_map_to_their_variants() {
        assert!(matches!(
            RepoError::from_unique_constraint("members_username_key"),
            Some(RepoError::DuplicateUsername)
        ));
        assert!(matches!(
            RepoError::from_unique_constraint("members_api_key_key"),
            Some(RepoError::DuplicateApiKey)
        ));
        assert!(RepoError::from_unique_constraint("members_pkey").is_none());
    }
}

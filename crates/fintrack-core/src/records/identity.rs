use std::collections::BTreeMap;

use crate::error::FinTrackError;
use crate::types::OwnerId;
use crate::FinTrackResult;

/// Maps an authenticated caller to the key its records are filed under.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, principal: &str) -> FinTrackResult<OwnerId>;
}

/// Fixed table of known callers.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentities {
    known: BTreeMap<String, OwnerId>,
}

impl StaticIdentities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, principal: impl Into<String>, owner: OwnerId) -> Self {
        self.known.insert(principal.into(), owner);
        self
    }
}

impl IdentityResolver for StaticIdentities {
    fn resolve(&self, principal: &str) -> FinTrackResult<OwnerId> {
        self.known
            .get(principal)
            .cloned()
            .ok_or_else(|| FinTrackError::Unauthorized(format!("unknown principal '{principal}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_known_principal() {
        let ids = StaticIdentities::new().with("asha", OwnerId::new("user-1"));
        assert_eq!(ids.resolve("asha").unwrap(), OwnerId::new("user-1"));
    }

    #[test]
    fn test_unknown_principal_is_unauthorized() {
        let ids = StaticIdentities::new();
        assert!(matches!(ids.resolve("mallory"), Err(FinTrackError::Unauthorized(_))));
    }
}

//! Credential validation against the configured user directory.

use std::collections::{BTreeMap, HashMap};

use crate::config::UserConfig;

/// Result of checking a username/password pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialCheck {
    Valid,
    InvalidUser,
    InvalidPassword,
}

/// The identity source consulted on login.
pub trait CredentialValidator: Send + Sync {
    fn validate(&self, user: &str, password: &str) -> CredentialCheck;

    /// Attributes carried by a new session for `user`.
    fn attributes(&self, _user: &str) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// Users declared in the gateway configuration.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, UserConfig>,
}

impl UserDirectory {
    pub fn new(users: HashMap<String, UserConfig>) -> Self {
        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl CredentialValidator for UserDirectory {
    fn validate(&self, user: &str, password: &str) -> CredentialCheck {
        match self.users.get(user) {
            None => CredentialCheck::InvalidUser,
            Some(entry) if entry.password == password => CredentialCheck::Valid,
            Some(_) => CredentialCheck::InvalidPassword,
        }
    }

    fn attributes(&self, user: &str) -> BTreeMap<String, String> {
        self.users
            .get(user)
            .map(|u| u.auth_headers.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        let mut auth_headers = BTreeMap::new();
        auth_headers.insert("sm_universalid".to_string(), "bob01".to_string());
        let mut users = HashMap::new();
        users.insert(
            "bob".to_string(),
            UserConfig { password: "test1234".to_string(), auth_headers },
        );
        UserDirectory::new(users)
    }

    #[test]
    fn test_validate() {
        let dir = directory();
        assert_eq!(dir.validate("bob", "test1234"), CredentialCheck::Valid);
        assert_eq!(dir.validate("bob", "wrong"), CredentialCheck::InvalidPassword);
        assert_eq!(dir.validate("mallory", "test1234"), CredentialCheck::InvalidUser);
        assert_eq!(dir.validate("", ""), CredentialCheck::InvalidUser);
    }

    #[test]
    fn test_attributes() {
        let dir = directory();
        assert_eq!(dir.attributes("bob")["sm_universalid"], "bob01");
        assert!(dir.attributes("mallory").is_empty());
    }
}

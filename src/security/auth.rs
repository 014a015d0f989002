//! Caller authentication against a static identity table.
//!
//! # Responsibilities
//! - Hold the identity → token mapping loaded at startup
//! - Decide whether a presented token belongs to a claimed identity
//!
//! # Design Decisions
//! - The table is immutable after construction and shared through `Arc`
//!   without locking
//! - Keys are parsed into `Uuid` when the table is built, so lookups do not
//!   depend on the textual case of the identity
//! - Token comparison does not exit early on the first differing byte

use std::collections::HashMap;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::security::secret::Secret;

/// Errors raised while building an [`AuthTable`] from configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("auth key {key:?} is not a valid UUID")]
    InvalidIdentity { key: String },

    #[error("auth token for {id} is empty")]
    EmptyToken { id: Uuid },

    #[error("identity {id} is configured more than once")]
    DuplicateIdentity { id: Uuid },
}

/// Result of checking a presented token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Identity known and token matches.
    Success,
    /// Identity known but token does not match.
    Failure,
    /// Identity not present in the table.
    UnknownIdentity,
}

/// Read-only mapping from caller identity to its shared-secret token.
#[derive(Debug, Clone, Default)]
pub struct AuthTable {
    entries: HashMap<Uuid, Secret<String>>,
}

impl AuthTable {
    /// Build a table from the textual `[auth]` configuration section.
    ///
    /// Every key must parse as a UUID and every token must be non-empty. Two
    /// keys that spell the same UUID differently are rejected.
    pub fn from_config(raw: &HashMap<String, String>) -> Result<Self, Vec<AuthError>> {
        let mut entries = HashMap::with_capacity(raw.len());
        let mut errors = Vec::new();

        for (key, token) in raw {
            let id = match Uuid::parse_str(key.trim()) {
                Ok(id) => id,
                Err(_) => {
                    errors.push(AuthError::InvalidIdentity { key: key.clone() });
                    continue;
                }
            };
            if token.is_empty() {
                errors.push(AuthError::EmptyToken { id });
                continue;
            }
            if entries.insert(id, Secret::new(token.clone())).is_some() {
                errors.push(AuthError::DuplicateIdentity { id });
            }
        }

        if errors.is_empty() {
            Ok(Self { entries })
        } else {
            Err(errors)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check `presented` against the token stored for `id`.
    pub fn authenticate(&self, id: &Uuid, presented: &str) -> AuthOutcome {
        match self.entries.get(id) {
            None => AuthOutcome::UnknownIdentity,
            Some(expected) if constant_time_eq(presented, expected.reveal()) => {
                AuthOutcome::Success
            }
            Some(_) => AuthOutcome::Failure,
        }
    }
}

/// Compare two tokens in constant time with respect to their content.
///
/// Only the lengths are compared eagerly; token length is not secret.
fn constant_time_eq(a: &str, b: &str) -> bool {
    bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "825255ef-a9cf-42e9-8839-ada9a81f99cd";
    const TOKEN: &str = "1234567890_password";

    fn table() -> AuthTable {
        let mut raw = HashMap::new();
        raw.insert(ID.to_string(), TOKEN.to_string());
        AuthTable::from_config(&raw).unwrap()
    }

    #[test]
    fn accepts_matching_token() {
        let id = Uuid::parse_str(ID).unwrap();
        assert_eq!(table().authenticate(&id, TOKEN), AuthOutcome::Success);
    }

    #[test]
    fn rejects_wrong_token() {
        let id = Uuid::parse_str(ID).unwrap();
        let table = table();
        assert_eq!(table.authenticate(&id, "wrong"), AuthOutcome::Failure);
        assert_eq!(table.authenticate(&id, ""), AuthOutcome::Failure);
        assert_eq!(
            table.authenticate(&id, "1234567890_password_and_more"),
            AuthOutcome::Failure
        );
    }

    #[test]
    fn unknown_identity_regardless_of_token() {
        let table = table();
        let stranger = Uuid::new_v4();
        assert_eq!(table.authenticate(&stranger, TOKEN), AuthOutcome::UnknownIdentity);
        assert_eq!(table.authenticate(&stranger, ""), AuthOutcome::UnknownIdentity);
    }

    #[test]
    fn lookup_ignores_uuid_case() {
        let mut raw = HashMap::new();
        raw.insert(ID.to_uppercase(), TOKEN.to_string());
        let table = AuthTable::from_config(&raw).unwrap();
        assert_eq!(
            table.authenticate(&Uuid::parse_str(ID).unwrap(), TOKEN),
            AuthOutcome::Success
        );
    }

    #[test]
    fn from_config_collects_every_error() {
        let mut raw = HashMap::new();
        raw.insert("not-a-uuid".to_string(), TOKEN.to_string());
        raw.insert(ID.to_string(), String::new());

        let errors = AuthTable::from_config(&raw).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&AuthError::InvalidIdentity { key: "not-a-uuid".into() }));
        assert!(errors.contains(&AuthError::EmptyToken { id: Uuid::parse_str(ID).unwrap() }));
    }

    #[test]
    fn from_config_rejects_duplicate_spellings() {
        let mut raw = HashMap::new();
        raw.insert(ID.to_string(), TOKEN.to_string());
        raw.insert(ID.to_uppercase(), "other".to_string());

        let errors = AuthTable::from_config(&raw).unwrap_err();
        assert_eq!(
            errors,
            vec![AuthError::DuplicateIdentity { id: Uuid::parse_str(ID).unwrap() }]
        );
    }

    #[test]
    fn constant_time_eq_handles_lengths() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "ab"));
        assert!(!constant_time_eq("", "a"));
        assert!(constant_time_eq("", ""));
        let long = "x".repeat(256);
        assert!(!constant_time_eq("", &long));
    }
}

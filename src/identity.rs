//! Identity signal used to pick a snapshot key.
//!
//! flipdeck does not authenticate anyone. It receives an opaque "current
//! user" value and uses it only to keep progress separate per user.

use std::fmt;

/// Key under which a snapshot is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey(String);

impl SnapshotKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whose progress is being studied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    /// No signed-in user; progress is kept locally.
    #[default]
    Anonymous,
    /// An opaque user identifier from the identity provider.
    User(String),
}

impl Identity {
    /// Interpret the current-user signal. Blank values mean anonymous.
    pub fn from_current_user(user: Option<String>) -> Self {
        match user {
            Some(u) if !u.trim().is_empty() => Identity::User(u.trim().to_string()),
            _ => Identity::Anonymous,
        }
    }

    /// Storage key for this identity: `local`, or `user-<id>` with every
    /// character outside `[A-Za-z0-9_-]` replaced by `_`.
    pub fn snapshot_key(&self) -> SnapshotKey {
        match self {
            Identity::Anonymous => SnapshotKey("local".to_string()),
            Identity::User(id) => {
                let sanitized: String = id
                    .chars()
                    .map(|c| {
                        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                            c
                        } else {
                            '_'
                        }
                    })
                    .collect();
                SnapshotKey(format!("user-{}", sanitized))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_key() {
        assert_eq!(Identity::Anonymous.snapshot_key().as_str(), "local");
        assert_eq!(Identity::from_current_user(None), Identity::Anonymous);
        assert_eq!(
            Identity::from_current_user(Some("   ".to_string())),
            Identity::Anonymous
        );
    }

    #[test]
    fn test_user_key_is_sanitized() {
        let identity = Identity::from_current_user(Some("ada@example.com".to_string()));
        assert_eq!(identity.snapshot_key().as_str(), "user-ada_example_com");

        let traversal = Identity::User("../../etc".to_string());
        assert_eq!(traversal.snapshot_key().as_str(), "user-______etc");
    }

    #[test]
    fn test_distinct_users_distinct_keys() {
        let a = Identity::User("alice".to_string()).snapshot_key();
        let b = Identity::User("bob".to_string()).snapshot_key();
        assert_ne!(a, b);
        assert_ne!(a, Identity::Anonymous.snapshot_key());
    }
}

//! Branded ID newtypes for type safety.
//!
//! Every entity has a distinct ID type implemented as a newtype wrapper
//! around `String`. This prevents accidentally passing a reminder ID where a
//! task ID is expected.
//!
//! Generated IDs are UUID v7 (time-ordered) with an entity-specific prefix,
//! e.g. `task-0192f3a1-…`.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generate a prefixed UUID v7 string (time-ordered).
fn new_prefixed(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7())
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (prefixed UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(new_prefixed($prefix))
            }

            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for a user (the owner of tasks, reminders, metrics).
    UserId, "user"
}

branded_id! {
    /// Unique identifier for a task.
    TaskId, "task"
}

branded_id! {
    /// Unique identifier for a reminder.
    ReminderId, "rem"
}

branded_id! {
    /// Unique identifier for a live WebSocket connection.
    ConnectionId, "conn"
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn uuid_part(id: &str) -> &str {
        id.split_once('-').map(|(_, rest)| rest).unwrap_or(id)
    }

    #[test]
    fn task_id_has_prefix_and_v7_payload() {
        let id = TaskId::new();
        assert!(id.as_str().starts_with("task-"));
        let parsed = Uuid::parse_str(uuid_part(id.as_str())).expect("should be valid UUID");
        assert_eq!(parsed.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn user_id_has_prefix() {
        let id = UserId::new();
        assert!(id.as_str().starts_with("user-"));
    }

    #[test]
    fn reminder_id_has_prefix() {
        let id = ReminderId::new();
        assert!(id.as_str().starts_with("rem-"));
    }

    #[test]
    fn connection_id_has_prefix() {
        let id = ConnectionId::new();
        assert!(id.as_str().starts_with("conn-"));
    }

    #[test]
    fn ids_are_unique() {
        let a = TaskId::new();
        let b = TaskId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn from_string() {
        let id = TaskId::from_string("custom-id".to_owned());
        assert_eq!(id.as_str(), "custom-id");
    }

    #[test]
    fn from_str_ref() {
        let id = UserId::from("abc-123");
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn deref_to_str() {
        let id = TaskId::from("hello");
        let s: &str = &id;
        assert_eq!(s, "hello");
    }

    #[test]
    fn display() {
        let id = ReminderId::from("display-me");
        assert_eq!(format!("{id}"), "display-me");
    }

    #[test]
    fn into_string() {
        let id = UserId::from("convert");
        let s: String = id.into();
        assert_eq!(s, "convert");
    }

    #[test]
    fn serde_roundtrip() {
        let id = TaskId::from("serde-test");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"serde-test\"");
        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn serde_in_struct() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Envelope {
            user_id: UserId,
            task_id: TaskId,
        }

        let env = Envelope {
            user_id: UserId::from("user-1"),
            task_id: TaskId::from("task-1"),
        };
        let json = serde_json::to_string(&env).unwrap();
        let back: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(env, back);
    }

    #[test]
    fn hash_and_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        let id = UserId::from("same");
        let _ = set.insert(id.clone());
        let _ = set.insert(id.clone());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn default_creates_new() {
        let id1 = TaskId::default();
        let id2 = TaskId::default();
        assert_ne!(id1, id2, "default should create unique IDs");
    }

    #[test]
    fn into_inner() {
        let id = ReminderId::from("inner-test");
        let inner = id.into_inner();
        assert_eq!(inner, "inner-test");
    }
}

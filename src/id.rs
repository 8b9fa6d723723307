//! Canonical identifiers for actors and movies.
//!
//! The dataset delivers ids as either JSON numbers or strings. Both are
//! normalized once, at the relation-building boundary, into string-backed
//! newtypes so that nothing downstream branches on id representation.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an already-canonical id.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the id as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Unique key of an actor in the [`ActorDirectory`](crate::relation::ActorDirectory).
    ActorId
);

string_id!(
    /// Unique key of a movie in the [`MovieIndex`](crate::relation::MovieIndex).
    MovieId
);

/// Canonical string form of a raw JSON id token.
///
/// Strings pass through unchanged and integers are rendered in decimal.
/// Anything else (floats, booleans, null, containers) is not an id and
/// yields `None`.
pub fn canonical_token(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

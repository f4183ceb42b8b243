/// ID types for library entities
use serde::{Deserialize, Serialize};
use std::fmt;

/// The service hands out ids as JSON numbers in some places and strings in
/// others; every id is kept as its string form.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new id
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the inner string
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Read an id from a JSON scalar (string or integer).
            pub fn from_json(value: &serde_json::Value) -> Option<Self> {
                match value {
                    serde_json::Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
                    serde_json::Value::Number(n) => Some(Self(n.to_string())),
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
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
    /// Track identifier
    TrackId
);
string_id!(
    /// Album identifier
    AlbumId
);
string_id!(
    /// Artist identifier
    ArtistId
);
string_id!(
    /// Playlist identifier
    PlaylistId
);

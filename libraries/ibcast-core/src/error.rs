/// Core error types for ibcast
use thiserror::Error;

/// Result type alias using `LibraryError`
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Errors raised while turning a library dump into a snapshot.
///
/// The builder degrades gracefully wherever it can; these are only
/// returned when the dump has no usable shape at all.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// The dump is not even minimally parseable
    #[error("Malformed library data: {0}")]
    MalformedLibraryData(String),
}

impl LibraryError {
    /// Create a malformed library data error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedLibraryData(msg.into())
    }
}

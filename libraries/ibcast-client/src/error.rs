//! Error types for the ibcast client.

use ibcast_core::LibraryError;
use std::fmt;
use thiserror::Error;

/// The part of a session an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Config,
    Auth,
    Fetch,
    Select,
    Submit,
    Upload,
    Cache,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Config => "config",
            Stage::Auth => "auth",
            Stage::Fetch => "fetch",
            Stage::Select => "select",
            Stage::Submit => "submit",
            Stage::Upload => "upload",
            Stage::Cache => "cache",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when talking to the service or driving a session.
///
/// Every message starts with the stage that produced it, e.g.
/// `[submit] Nothing selected`.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Login rejected (bad credentials)
    #[error("[auth] Authentication failed: {0}")]
    AuthFailed(String),

    /// No valid token for a request that needs one
    #[error("[{stage}] Authentication required")]
    AuthRequired { stage: Stage },

    /// HTTP request failed
    #[error("[{stage}] HTTP request failed: {source}")]
    Network {
        stage: Stage,
        source: reqwest::Error,
    },

    /// Server is offline or unreachable
    #[error("[{stage}] Server unreachable: {message}")]
    ServerUnreachable { stage: Stage, message: String },

    /// Server returned a non-success HTTP status
    #[error("[{stage}] Server error ({status}): {message}")]
    ServerError {
        stage: Stage,
        status: u16,
        message: String,
    },

    /// The library dump could not be turned into a snapshot
    #[error("[fetch] {0}")]
    MalformedLibraryData(#[from] LibraryError),

    /// A response did not have the shape we expect
    #[error("[{stage}] Unexpected response: {message}")]
    UnexpectedResponse { stage: Stage, message: String },

    /// Refused locally: a playlist needs at least one track
    #[error("[submit] Nothing selected: refusing to create an empty playlist")]
    EmptySelection,

    /// The service answered `result: false`
    #[error("[{stage}] Rejected by server: {message}")]
    RemoteRejected { stage: Stage, message: String },

    /// Operation the service documents as not working
    #[error("[submit] {0} is not implemented by the service")]
    NotImplemented(&'static str),

    /// Undocumented endpoint used without opting in
    #[error("[{stage}] Undocumented API disabled: {operation}")]
    UndocumentedApiDisabled {
        stage: Stage,
        operation: &'static str,
    },

    /// Operation not allowed in the current session state
    #[error("[{stage}] Invalid session state: {message}")]
    InvalidState { stage: Stage, message: String },

    /// Invalid endpoint URL
    #[error("[config] Invalid URL: {0}")]
    InvalidUrl(String),

    /// File not found for upload
    #[error("[upload] File not found: {0}")]
    FileNotFound(String),

    /// IO error while reading a track or the cache file
    #[error("[{stage}] IO error: {source}")]
    Io {
        stage: Stage,
        source: std::io::Error,
    },

    /// Checksum cache file could not be read or written
    #[error("[cache] Checksum cache error: {0}")]
    Cache(String),
}

impl ClientError {
    /// The stage this error originated from
    pub fn stage(&self) -> Stage {
        match self {
            ClientError::AuthFailed(_) => Stage::Auth,
            ClientError::MalformedLibraryData(_) => Stage::Fetch,
            ClientError::EmptySelection | ClientError::NotImplemented(_) => Stage::Submit,
            ClientError::InvalidUrl(_) => Stage::Config,
            ClientError::FileNotFound(_) => Stage::Upload,
            ClientError::Cache(_) => Stage::Cache,
            ClientError::AuthRequired { stage }
            | ClientError::Network { stage, .. }
            | ClientError::ServerUnreachable { stage, .. }
            | ClientError::ServerError { stage, .. }
            | ClientError::UnexpectedResponse { stage, .. }
            | ClientError::RemoteRejected { stage, .. }
            | ClientError::UndocumentedApiDisabled { stage, .. }
            | ClientError::InvalidState { stage, .. }
            | ClientError::Io { stage, .. } => *stage,
        }
    }

    /// Authentication problems end the session; nothing else can proceed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::AuthFailed(_) | ClientError::AuthRequired { .. }
        )
    }

    /// Transport-level failures where retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Network { .. }
                | ClientError::ServerUnreachable { .. }
                | ClientError::ServerError { .. }
        )
    }

    pub(crate) fn io(stage: Stage) -> impl FnOnce(std::io::Error) -> Self {
        move |source| ClientError::Io { stage, source }
    }

    pub(crate) fn unexpected(stage: Stage, message: impl Into<String>) -> Self {
        ClientError::UnexpectedResponse {
            stage,
            message: message.into(),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// CLI error types
use ibcast_client::ClientError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("[config] Configuration error: {0}")]
    Config(String),

    #[error("[config] {0}")]
    Usage(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("[upload] {failed} of {total} uploads failed")]
    UploadsFailed { failed: usize, total: usize },
}

//! Types for iBroadcast API requests and responses.

use ibcast_core::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub(crate) const DEFAULT_API_URL: &str = "https://json.ibroadcast.com/s/JSON/status";
pub(crate) const DEFAULT_UPLOAD_URL: &str = "https://upload.ibroadcast.com";
pub(crate) const DEFAULT_CLIENT_NAME: &str = "ibcast";

/// Configuration for connecting to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON API endpoint every command is posted to
    pub api_url: String,
    /// Upload endpoint (also serves the checksum list)
    pub upload_url: String,
    /// Client name reported with every command
    pub client_name: String,
    /// Device name reported with every command
    pub device_name: String,
    /// Client version reported with every command
    pub version: String,
    /// Opt in to endpoints the service does not document
    pub allow_undocumented: bool,
}

impl ClientConfig {
    /// Config pointing at custom endpoints (e.g. a test server).
    pub fn new(api_url: impl Into<String>, upload_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            upload_url: upload_url.into(),
            ..Self::default()
        }
    }

    pub fn with_undocumented_apis(mut self, allow: bool) -> Self {
        self.allow_undocumented = allow;
        self
    }

    pub fn with_device_name(mut self, device_name: impl Into<String>) -> Self {
        self.device_name = device_name.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            device_name: DEFAULT_CLIENT_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            allow_undocumented: false,
        }
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Request body for login (`mode: status` with credentials).
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub mode: &'static str,
    pub email_address: &'a str,
    pub password: &'a str,
    pub version: &'a str,
    pub client: &'a str,
    pub supported_types: u8,
}

/// Token pair handed out on login.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct Credentials {
    pub user_id: String,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Response from successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub user_id: String,
    pub username: String,
}

// =============================================================================
// Playlist Types
// =============================================================================

/// A playlist to create.
///
/// `tracks` order becomes the playlist order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
    #[serde(rename = "make_public")]
    pub public: bool,
    pub tracks: Vec<TrackId>,
}

impl NewPlaylist {
    pub fn new(name: impl Into<String>, tracks: Vec<TrackId>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            public: false,
            tracks,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }
}

// =============================================================================
// Upload Types
// =============================================================================

/// Checksum list served by the upload endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ChecksumResponse {
    pub md5: Vec<String>,
}

/// One entry of the supported filetype list.
#[derive(Debug, Deserialize)]
pub(crate) struct SupportedType {
    pub extension: String,
}

/// What happened to a file handed to the uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Uploaded; the service may or may not report the new track id
    Uploaded {
        track_id: Option<TrackId>,
        checksum: String,
    },
    /// Skipped because the service already has identical content
    AlreadyPresent { checksum: String },
}

impl UploadOutcome {
    pub fn checksum(&self) -> &str {
        match self {
            UploadOutcome::Uploaded { checksum, .. } | UploadOutcome::AlreadyPresent { checksum } => {
                checksum
            }
        }
    }
}

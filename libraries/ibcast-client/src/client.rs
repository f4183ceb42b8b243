//! Main iBroadcast client.

use crate::auth::AuthClient;
use crate::error::{ClientError, Result, Stage};
use crate::library::LibraryClient;
use crate::playlist::PlaylistClient;
use crate::types::{ClientConfig, Credentials, LoginResponse};
use crate::upload::UploadClient;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

/// Main client for interacting with the iBroadcast service.
///
/// Holds the HTTP client and, once logged in, the token pair. Library,
/// playlist and upload operations are reached through handles that carry a
/// copy of the credentials.
///
/// # Example
///
/// ```ignore
/// use ibcast_client::{ClientConfig, IbcastClient, NewPlaylist};
///
/// let client = IbcastClient::new(ClientConfig::default())?;
/// client.login("me@example.com", "secret").await?;
///
/// let dump = client.library().await?.client().fetch_library().await?;
///
/// let playlist = NewPlaylist::new("Mix", track_ids);
/// let id = client.playlists().await?.client().create_playlist(&playlist).await?;
///
/// client.logout().await?;
/// ```
pub struct IbcastClient {
    http: Client,
    config: ClientConfig,
    credentials: Arc<RwLock<Option<Credentials>>>,
}

impl IbcastClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        validate_url(&config.api_url)?;
        validate_url(&config.upload_url)?;

        // Create HTTP client with reasonable defaults
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!(
                "{}/{}",
                config.client_name,
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| ClientError::Network {
                stage: Stage::Config,
                source: e,
            })?;

        Ok(Self {
            http,
            config,
            credentials: Arc::new(RwLock::new(None)),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Check if the client holds a token.
    pub async fn is_authenticated(&self) -> bool {
        self.credentials.read().await.is_some()
    }

    /// Login with email address and password.
    ///
    /// On success, the token is stored for subsequent requests.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let auth_client = AuthClient::new(&self.http, &self.config);
        let (response, credentials) = auth_client.login(username, password).await?;

        *self.credentials.write().await = Some(credentials);
        Ok(response)
    }

    /// Logout.
    ///
    /// The stored token is dropped even when the remote logout fails.
    pub async fn logout(&self) -> Result<()> {
        let Some(credentials) = self.credentials.write().await.take() else {
            debug!("Logout without a session, nothing to do");
            return Ok(());
        };

        let auth_client = AuthClient::new(&self.http, &self.config);
        let result = auth_client.logout(&credentials).await;
        if let Err(e) = &result {
            warn!(error = %e, "Remote logout failed");
        }
        result
    }

    async fn credentials(&self, stage: Stage) -> Result<Credentials> {
        self.credentials
            .read()
            .await
            .clone()
            .ok_or(ClientError::AuthRequired { stage })
    }

    /// Get a library client for fetch operations.
    ///
    /// Returns an error if not authenticated.
    pub async fn library(&self) -> Result<LibraryClientHandle> {
        Ok(LibraryClientHandle {
            http: self.http.clone(),
            config: self.config.clone(),
            credentials: self.credentials(Stage::Fetch).await?,
        })
    }

    /// Get a playlist client.
    ///
    /// Returns an error if not authenticated.
    pub async fn playlists(&self) -> Result<PlaylistClientHandle> {
        Ok(PlaylistClientHandle {
            http: self.http.clone(),
            config: self.config.clone(),
            credentials: self.credentials(Stage::Submit).await?,
        })
    }

    /// Get an upload client for uploading tracks.
    ///
    /// Returns an error if not authenticated.
    pub async fn upload(&self) -> Result<UploadClientHandle> {
        Ok(UploadClientHandle {
            http: self.http.clone(),
            config: self.config.clone(),
            credentials: self.credentials(Stage::Upload).await?,
        })
    }
}

fn validate_url(raw: &str) -> Result<()> {
    if raw.is_empty() {
        return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
    }

    let url = Url::parse(raw).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ClientError::InvalidUrl(format!(
            "{}: unsupported scheme {}, expected http or https",
            raw, other
        ))),
    }
}

/// Handle for library operations.
///
/// This is returned by `IbcastClient::library()`.
pub struct LibraryClientHandle {
    http: Client,
    config: ClientConfig,
    credentials: Credentials,
}

impl LibraryClientHandle {
    /// Get the library client.
    pub fn client(&self) -> LibraryClient<'_> {
        LibraryClient::new(&self.http, &self.config, &self.credentials)
    }
}

/// Handle for playlist operations.
pub struct PlaylistClientHandle {
    http: Client,
    config: ClientConfig,
    credentials: Credentials,
}

impl PlaylistClientHandle {
    /// Get the playlist client.
    pub fn client(&self) -> PlaylistClient<'_> {
        PlaylistClient::new(&self.http, &self.config, &self.credentials)
    }
}

/// Handle for upload operations.
pub struct UploadClientHandle {
    http: Client,
    config: ClientConfig,
    credentials: Credentials,
}

impl UploadClientHandle {
    /// Get the upload client.
    pub fn client(&self) -> UploadClient<'_> {
        UploadClient::new(&self.http, &self.config, &self.credentials)
    }
}

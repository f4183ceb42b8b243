//! The remote operations a session depends on.

use crate::client::IbcastClient;
use crate::error::Result;
use crate::types::{LoginResponse, NewPlaylist};
use async_trait::async_trait;
use ibcast_core::PlaylistId;
use serde_json::Value;

/// Remote music library a `Session` drives.
///
/// `IbcastClient` is the production implementation; tests substitute a mock.
#[async_trait]
pub trait MusicService: Send + Sync {
    /// Authenticate and keep the token for later calls
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse>;

    /// End the remote session, if any
    async fn logout(&self) -> Result<()>;

    /// Fetch the raw library dump
    async fn fetch_library(&self) -> Result<Value>;

    /// Create a playlist, returning the id the service assigned
    async fn create_playlist(&self, playlist: &NewPlaylist) -> Result<PlaylistId>;

    /// Delete a playlist
    async fn delete_playlist(&self, playlist_id: &PlaylistId) -> Result<()>;
}

#[async_trait]
impl MusicService for IbcastClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        IbcastClient::login(self, username, password).await
    }

    async fn logout(&self) -> Result<()> {
        IbcastClient::logout(self).await
    }

    async fn fetch_library(&self) -> Result<Value> {
        self.library().await?.client().fetch_library().await
    }

    async fn create_playlist(&self, playlist: &NewPlaylist) -> Result<PlaylistId> {
        self.playlists()
            .await?
            .client()
            .create_playlist(playlist)
            .await
    }

    async fn delete_playlist(&self, playlist_id: &PlaylistId) -> Result<()> {
        self.playlists()
            .await?
            .client()
            .delete_playlist(playlist_id)
            .await
    }
}

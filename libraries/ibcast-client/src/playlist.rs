//! Playlist operations.

use crate::error::{ClientError, Result, Stage};
use crate::transport;
use crate::types::{ClientConfig, Credentials, NewPlaylist};
use ibcast_core::PlaylistId;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Playlist client.
pub struct PlaylistClient<'a> {
    http: &'a Client,
    config: &'a ClientConfig,
    credentials: &'a Credentials,
}

impl<'a> PlaylistClient<'a> {
    pub(crate) fn new(
        http: &'a Client,
        config: &'a ClientConfig,
        credentials: &'a Credentials,
    ) -> Self {
        Self {
            http,
            config,
            credentials,
        }
    }

    /// Create a playlist.
    ///
    /// An empty track list is refused locally without contacting the
    /// service. Name uniqueness is left to the service.
    pub async fn create_playlist(&self, playlist: &NewPlaylist) -> Result<PlaylistId> {
        if playlist.tracks.is_empty() {
            return Err(ClientError::EmptySelection);
        }

        debug!(
            name = %playlist.name,
            tracks = playlist.tracks.len(),
            public = playlist.public,
            "Creating playlist"
        );

        let extra = match serde_json::to_value(playlist) {
            Ok(Value::Object(fields)) => fields,
            _ => {
                return Err(ClientError::unexpected(
                    Stage::Submit,
                    "playlist did not serialize to an object",
                ))
            }
        };
        let body = transport::command(self.config, self.credentials, "createplaylist", extra);

        let text = transport::send(
            self.http.post(&self.config.api_url).json(&body),
            Stage::Submit,
        )
        .await?;
        let response = transport::parse(&text, Stage::Submit)?;
        transport::ensure_authenticated(&response, Stage::Submit)?;
        transport::ensure_accepted(&response, Stage::Submit)?;

        let playlist_id = response
            .get("playlist_id")
            .and_then(PlaylistId::from_json)
            .ok_or_else(|| ClientError::unexpected(Stage::Submit, "no playlist id in response"))?;

        info!(
            playlist_id = %playlist_id,
            name = %playlist.name,
            tracks = playlist.tracks.len(),
            "Playlist created"
        );
        Ok(playlist_id)
    }

    /// Delete a playlist.
    ///
    /// The service documents its delete command as not working, so this
    /// always fails without sending anything.
    pub async fn delete_playlist(&self, playlist_id: &PlaylistId) -> Result<()> {
        warn!(playlist_id = %playlist_id, "Playlist deletion is not supported by the service");
        Err(ClientError::NotImplemented("playlist deletion"))
    }
}

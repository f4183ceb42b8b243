//! Track upload operations.
//!
//! The upload endpoint is undocumented; every call here is refused unless
//! `ClientConfig::allow_undocumented` is set.

use crate::checksum::{file_md5, ChecksumCache};
use crate::error::{ClientError, Result, Stage};
use crate::library::LibraryClient;
use crate::transport;
use crate::types::{ClientConfig, Credentials, UploadOutcome};
use ibcast_core::TrackId;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Upload client.
pub struct UploadClient<'a> {
    http: &'a Client,
    config: &'a ClientConfig,
    credentials: &'a Credentials,
}

impl<'a> UploadClient<'a> {
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

    /// Upload a single track file.
    ///
    /// Unless `force` is set, the file is skipped when the service already
    /// holds content with the same MD5. The service's checksum list is
    /// fetched into `cache` the first time it is needed for that cache
    /// instance; a cache loaded from disk always fetches a fresh list.
    pub async fn upload_track(
        &self,
        file_path: &Path,
        cache: &mut ChecksumCache,
        force: bool,
    ) -> Result<UploadOutcome> {
        transport::ensure_undocumented_allowed(self.config, Stage::Upload, "track upload")?;

        if !file_path.is_file() {
            return Err(ClientError::FileNotFound(
                file_path.display().to_string(),
            ));
        }

        let checksum = file_md5(file_path)
            .await
            .map_err(ClientError::io(Stage::Upload))?;

        if !force {
            if !cache.remote_fetched() {
                let remote = LibraryClient::new(self.http, self.config, self.credentials)
                    .fetch_checksums()
                    .await?;
                cache.replace_remote(remote);
            }
            if cache.contains_checksum(&checksum) {
                info!(file = %file_path.display(), checksum = %checksum, "Already uploaded, skipping");
                return Ok(UploadOutcome::AlreadyPresent { checksum });
            }
        }

        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("track")
            .to_string();

        debug!(file = %file_path.display(), "Uploading track");

        let contents = tokio::fs::read(file_path)
            .await
            .map_err(ClientError::io(Stage::Upload))?;
        let file_size = contents.len();

        let file_part = Part::bytes(contents)
            .file_name(file_name.clone())
            .mime_str(mime_type_for_file(file_path))
            .map_err(|e| ClientError::Network {
                stage: Stage::Upload,
                source: e,
            })?;

        let form = Form::new()
            .text("user_id", self.credentials.user_id.clone())
            .text("token", self.credentials.token.clone())
            .text("file_path", file_path.display().to_string())
            .text("method", self.config.client_name.clone())
            .part("file", file_part);

        let text = transport::send(
            self.http.post(&self.config.upload_url).multipart(form),
            Stage::Upload,
        )
        .await?;
        let response = transport::parse(&text, Stage::Upload)?;
        transport::ensure_authenticated(&response, Stage::Upload)?;

        // Unlike the JSON commands, a missing `result` counts as failure here.
        if response.get("result") != Some(&Value::Bool(true)) {
            return Err(ClientError::RemoteRejected {
                stage: Stage::Upload,
                message: response
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("upload not accepted")
                    .to_string(),
            });
        }

        let track_id = response.get("track_id").and_then(TrackId::from_json);
        cache.record_upload(track_id.clone(), &checksum);

        info!(
            file = %file_name,
            size = file_size,
            track_id = ?track_id,
            "Track uploaded"
        );

        Ok(UploadOutcome::Uploaded { track_id, checksum })
    }
}

/// Get MIME type for audio file.
fn mime_type_for_file(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("opus") => "audio/opus",
        Some("wav") => "audio/wav",
        Some("m4a") | Some("aac") => "audio/mp4",
        Some("wma") => "audio/x-ms-wma",
        _ => "application/octet-stream",
    }
}

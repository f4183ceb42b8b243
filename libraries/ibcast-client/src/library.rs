//! Library fetch operations.

use crate::error::{ClientError, Result, Stage};
use crate::transport;
use crate::types::{ChecksumResponse, ClientConfig, Credentials, SupportedType};
use ibcast_core::LibraryError;
use reqwest::Client;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

/// Library client.
pub struct LibraryClient<'a> {
    http: &'a Client,
    config: &'a ClientConfig,
    credentials: &'a Credentials,
}

impl<'a> LibraryClient<'a> {
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

    /// Fetch the raw library dump.
    ///
    /// The dump is returned untouched; `ibcast_core::LibraryBuilder` turns
    /// it into a snapshot.
    pub async fn fetch_library(&self) -> Result<Value> {
        debug!(url = %self.config.api_url, "Fetching library");

        let body = transport::command(self.config, self.credentials, "library", Map::new());
        let text = transport::send(
            self.http.post(&self.config.api_url).json(&body),
            Stage::Fetch,
        )
        .await?;

        let dump: Value = serde_json::from_str(&text).map_err(|e| {
            ClientError::MalformedLibraryData(LibraryError::malformed(format!(
                "library response is not JSON: {}",
                e
            )))
        })?;
        transport::ensure_authenticated(&dump, Stage::Fetch)?;
        transport::ensure_accepted(&dump, Stage::Fetch)?;

        debug!(bytes = text.len(), "Fetched library");
        Ok(dump)
    }

    /// Fetch the file extensions the service accepts for upload.
    ///
    /// Undocumented endpoint.
    pub async fn fetch_supported_filetypes(&self) -> Result<Vec<String>> {
        transport::ensure_undocumented_allowed(self.config, Stage::Fetch, "supported filetypes")?;
        debug!("Fetching supported filetypes");

        let mut extra = Map::new();
        extra.insert("supported_types".into(), Value::from(1));
        let body = transport::command(self.config, self.credentials, "status", extra);

        let text = transport::send(
            self.http.post(&self.config.api_url).json(&body),
            Stage::Fetch,
        )
        .await?;
        let response = transport::parse(&text, Stage::Fetch)?;
        transport::ensure_authenticated(&response, Stage::Fetch)?;

        let supported = response
            .get("supported")
            .cloned()
            .ok_or_else(|| ClientError::unexpected(Stage::Fetch, "no \"supported\" list in response"))?;
        let supported: Vec<SupportedType> = serde_json::from_value(supported).map_err(|e| {
            ClientError::unexpected(Stage::Fetch, format!("bad \"supported\" list: {}", e))
        })?;

        let extensions: Vec<String> = supported.into_iter().map(|t| t.extension).collect();
        debug!(count = extensions.len(), "Fetched supported filetypes");
        Ok(extensions)
    }

    /// Fetch the MD5 of every file the service already holds.
    ///
    /// Undocumented endpoint served by the upload host.
    pub async fn fetch_checksums(&self) -> Result<HashSet<String>> {
        transport::ensure_undocumented_allowed(self.config, Stage::Fetch, "checksum list")?;
        debug!(url = %self.config.upload_url, "Fetching checksums");

        let form = [
            ("user_id", self.credentials.user_id.as_str()),
            ("token", self.credentials.token.as_str()),
        ];
        let text = transport::send(
            self.http.post(&self.config.upload_url).form(&form),
            Stage::Fetch,
        )
        .await?;

        let response = transport::parse(&text, Stage::Fetch)?;
        transport::ensure_authenticated(&response, Stage::Fetch)?;
        let checksums: ChecksumResponse = serde_json::from_value(response)
            .map_err(|e| ClientError::unexpected(Stage::Fetch, format!("no checksum list: {}", e)))?;

        debug!(count = checksums.md5.len(), "Fetched checksums");
        Ok(checksums.md5.into_iter().collect())
    }
}

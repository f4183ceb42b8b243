/// CLI configuration
use crate::error::{CliError, Result};
use ibcast_client::ClientConfig;
use ibcast_core::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "ibcast.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_api")]
    pub api: ApiSettings,

    #[serde(default = "default_matching")]
    pub matching: MatchingSettings,

    #[serde(default = "default_upload")]
    pub upload: UploadSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiSettings {
    #[serde(default = "default_api_url")]
    pub url: String,

    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    #[serde(default = "default_device_name")]
    pub device_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchingSettings {
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadSettings {
    #[serde(default)]
    pub allow_undocumented: bool,

    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
}

impl CliConfig {
    /// Load configuration from file and environment.
    ///
    /// An explicit `path` must exist; otherwise `ibcast.toml` in the working
    /// directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) if !path.exists() => {
                return Err(CliError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables, e.g. IBCAST_API__UPLOAD_URL
        settings = settings.add_source(
            config::Environment::with_prefix("IBCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api.url.is_empty() {
            return Err(CliError::Config(
                "API URL is required (set IBCAST_API__URL)".to_string(),
            ));
        }

        if self.api.upload_url.is_empty() {
            return Err(CliError::Config(
                "upload URL is required (set IBCAST_API__UPLOAD_URL)".to_string(),
            ));
        }

        if self.upload.cache_path.as_os_str().is_empty() {
            return Err(CliError::Config("checksum cache path is empty".to_string()));
        }

        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.api.url, &self.api.upload_url)
            .with_device_name(&self.api.device_name)
            .with_undocumented_apis(self.upload.allow_undocumented)
    }

    pub fn match_policy(&self) -> MatchPolicy {
        if self.matching.case_sensitive {
            MatchPolicy::case_sensitive()
        } else {
            MatchPolicy::case_insensitive()
        }
    }
}

// Default values
fn default_api() -> ApiSettings {
    ApiSettings {
        url: default_api_url(),
        upload_url: default_upload_url(),
        device_name: default_device_name(),
    }
}

fn default_api_url() -> String {
    ClientConfig::default().api_url
}

fn default_upload_url() -> String {
    ClientConfig::default().upload_url
}

fn default_device_name() -> String {
    ClientConfig::default().device_name
}

fn default_matching() -> MatchingSettings {
    MatchingSettings {
        case_sensitive: default_case_sensitive(),
    }
}

fn default_case_sensitive() -> bool {
    true
}

fn default_upload() -> UploadSettings {
    UploadSettings {
        allow_undocumented: false,
        cache_path: default_cache_path(),
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(".ibcast/checksums.json")
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api: default_api(),
            matching: default_matching(),
            upload: default_upload(),
        }
    }
}

//! ibcast Client
//!
//! HTTP client library for the iBroadcast JSON API, plus the session flow
//! that ties it to the selection engine in `ibcast-core`.
//!
//! # Features
//!
//! - **Authentication**: login/logout with email and password
//! - **Library**: fetch the raw library dump and build a snapshot from it
//! - **Playlists**: create a playlist from the current selection
//! - **Upload** (undocumented API): upload tracks, skipping known checksums
//!
//! # Example
//!
//! ```ignore
//! use ibcast_client::{ClientConfig, IbcastClient, Session};
//! use ibcast_core::MatchPolicy;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = IbcastClient::new(ClientConfig::default())?;
//!     let mut session = Session::new(client, MatchPolicy::default());
//!
//!     session.login("me@example.com", "secret").await?;
//!     session.load_library().await?;
//!     session.select_folder("Music/Rock")?;
//!     session.select_albums("Sampler*")?;
//!
//!     let playlist_id = session.submit("Rock mix", "Made by ibcast", false).await?;
//!     println!("Created playlist {}", playlist_id);
//!
//!     session.logout().await?;
//!     Ok(())
//! }
//! ```

mod auth;
mod checksum;
mod client;
mod error;
mod library;
mod playlist;
mod service;
mod session;
mod transport;
mod types;
mod upload;

// Re-export main types
pub use checksum::{file_md5, ChecksumCache};
pub use client::{IbcastClient, LibraryClientHandle, PlaylistClientHandle, UploadClientHandle};
pub use error::{ClientError, Result, Stage};
pub use service::MusicService;
pub use session::{Session, SessionState};
pub use types::{ClientConfig, LoginResponse, NewPlaylist, UploadOutcome};

// Re-export sub-clients for direct use if needed
pub use library::LibraryClient;
pub use playlist::PlaylistClient;
pub use upload::UploadClient;

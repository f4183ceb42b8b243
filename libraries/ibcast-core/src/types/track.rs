//! Track types

use super::{AlbumId, ArtistId, TrackId};
use serde::{Deserialize, Serialize};

/// A track from the remote library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub album_id: Option<AlbumId>,
    pub artist_id: Option<ArtistId>,
    /// Slash-delimited virtual folder, as stored by the service
    pub folder: String,
    pub track_number: Option<u32>,
    pub year: Option<i32>,
    /// Original file name at upload time
    pub file_name: Option<String>,
    /// MD5 of the file contents, filled in from the checksum cache
    pub checksum: Option<String>,
}

impl Track {
    /// Create a track with only the fields needed for selection
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            album_id: None,
            artist_id: None,
            folder: folder.into(),
            track_number: None,
            year: None,
            file_name: None,
            checksum: None,
        }
    }

    /// Attach the owning album
    pub fn with_album(mut self, album_id: impl Into<AlbumId>) -> Self {
        self.album_id = Some(album_id.into());
        self
    }
}

//! Album types

use super::{AlbumId, ArtistId, TrackId};
use serde::{Deserialize, Serialize};

/// An album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub artist_id: Option<ArtistId>,
    /// Member tracks in album order
    pub tracks: Vec<TrackId>,
}

impl Album {
    pub fn new(id: impl Into<AlbumId>, name: impl Into<String>, tracks: Vec<TrackId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist_id: None,
            tracks,
        }
    }
}

//! Playlist types

use super::{PlaylistId, TrackId};
use serde::{Deserialize, Serialize};

/// A playlist that already exists in the remote library.
///
/// Only what is needed to recognise a playlist by name is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: PlaylistId,
    pub name: String,
    pub description: Option<String>,
    pub tracks: Vec<TrackId>,
}

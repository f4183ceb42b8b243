//! Artist types

use super::{ArtistId, TrackId};
use serde::{Deserialize, Serialize};

/// An artist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub tracks: Vec<TrackId>,
}

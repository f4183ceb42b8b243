//! In-memory copy of one library fetch.

use crate::types::{Album, AlbumId, Artist, ArtistId, PlaylistId, PlaylistSummary, Track, TrackId};
use std::collections::HashMap;

/// One fetched, read-only copy of the user's library.
///
/// Built by [`crate::LibraryBuilder`]; a new fetch produces a new snapshot
/// rather than patching an existing one.
#[derive(Debug, Clone, Default)]
pub struct LibrarySnapshot {
    tracks: HashMap<TrackId, Track>,
    albums: HashMap<AlbumId, Album>,
    artists: HashMap<ArtistId, Artist>,
    playlists: HashMap<PlaylistId, PlaylistSummary>,
}

impl LibrarySnapshot {
    /// An empty snapshot
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble a snapshot from already-typed entities.
    ///
    /// Album, artist and playlist members that do not name a known track
    /// are dropped so the snapshot only ever references existing tracks.
    pub fn from_parts(
        tracks: impl IntoIterator<Item = Track>,
        albums: impl IntoIterator<Item = Album>,
        artists: impl IntoIterator<Item = Artist>,
        playlists: impl IntoIterator<Item = PlaylistSummary>,
    ) -> Self {
        let tracks: HashMap<TrackId, Track> =
            tracks.into_iter().map(|t| (t.id.clone(), t)).collect();

        let albums = albums
            .into_iter()
            .map(|mut a| {
                a.tracks.retain(|id| tracks.contains_key(id));
                (a.id.clone(), a)
            })
            .collect();

        let artists = artists
            .into_iter()
            .map(|mut a| {
                a.tracks.retain(|id| tracks.contains_key(id));
                (a.id.clone(), a)
            })
            .collect();

        let playlists = playlists
            .into_iter()
            .map(|mut p| {
                p.tracks.retain(|id| tracks.contains_key(id));
                (p.id.clone(), p)
            })
            .collect();

        Self {
            tracks,
            albums,
            artists,
            playlists,
        }
    }

    pub fn track(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.get(id)
    }

    pub fn album(&self, id: &AlbumId) -> Option<&Album> {
        self.albums.get(id)
    }

    pub fn artist(&self, id: &ArtistId) -> Option<&Artist> {
        self.artists.get(id)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn albums(&self) -> impl Iterator<Item = &Album> {
        self.albums.values()
    }

    pub fn artists(&self) -> impl Iterator<Item = &Artist> {
        self.artists.values()
    }

    pub fn playlists(&self) -> impl Iterator<Item = &PlaylistSummary> {
        self.playlists.values()
    }

    /// Find an existing playlist by exact name
    pub fn playlist_by_name(&self, name: &str) -> Option<&PlaylistSummary> {
        self.playlists.values().find(|p| p.name == name)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn album_count(&self) -> usize {
        self.albums.len()
    }

    pub fn artist_count(&self) -> usize {
        self.artists.len()
    }

    pub fn playlist_count(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Fill in track checksums from a lookup (e.g. the checksum cache).
    ///
    /// Consumes the snapshot so the read-only contract holds once it is
    /// handed to the matchers.
    pub fn with_checksums<'a>(
        mut self,
        lookup: impl Fn(&TrackId) -> Option<&'a str>,
    ) -> Self {
        for track in self.tracks.values_mut() {
            if let Some(sum) = lookup(&track.id) {
                track.checksum = Some(sum.to_string());
            }
        }
        self
    }
}

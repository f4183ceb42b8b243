//! Turns the raw library dump into a typed [`LibrarySnapshot`].
//!
//! The service returns each section (`tracks`, `albums`, `artists`,
//! `playlists`) as an object keyed by entity id. Every value is a positional
//! array, and a `map` entry in the same object names the column index of each
//! field:
//!
//! ```json
//! {
//!   "library": {
//!     "tracks": {
//!       "map": { "title": 2, "album_id": 5, "path": 12 },
//!       "9001": [1, 2004, "Song", "Rock", 215, 17, 0, 3, "", "", false, 0, "Music/Rock"]
//!     }
//!   }
//! }
//! ```
//!
//! The schema is not versioned and the service adds columns over time, so the
//! builder only looks up the columns it needs, falls back to the documented
//! default index when the `map` does not mention one, and ignores the rest.

use crate::error::{LibraryError, Result};
use crate::snapshot::LibrarySnapshot;
use crate::types::{Album, AlbumId, Artist, ArtistId, PlaylistId, PlaylistSummary, Track, TrackId};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

const MAP_KEY: &str = "map";

/// Default column layout of the `tracks` section
mod track_columns {
    pub const TRACK_NUMBER: (&str, usize) = ("track", 0);
    pub const YEAR: (&str, usize) = ("year", 1);
    pub const TITLE: (&str, usize) = ("title", 2);
    pub const ALBUM_ID: (&str, usize) = ("album_id", 5);
    pub const ARTIST_ID: (&str, usize) = ("artist_id", 7);
    pub const PATH: (&str, usize) = ("path", 12);
    pub const FILE: (&str, usize) = ("file", 16);
}

/// Default column layout of the `albums` section
mod album_columns {
    pub const NAME: (&str, usize) = ("name", 0);
    pub const TRACKS: (&str, usize) = ("tracks", 1);
    pub const ARTIST_ID: (&str, usize) = ("artist_id", 2);
}

/// Default column layout of the `artists` section
mod artist_columns {
    pub const NAME: (&str, usize) = ("name", 0);
    pub const TRACKS: (&str, usize) = ("tracks", 1);
}

/// Default column layout of the `playlists` section
mod playlist_columns {
    pub const NAME: (&str, usize) = ("name", 0);
    pub const TRACKS: (&str, usize) = ("tracks", 1);
    pub const DESCRIPTION: (&str, usize) = ("description", 6);
}

/// Builds library snapshots from raw dumps.
#[derive(Debug, Clone, Default)]
pub struct LibraryBuilder {
    _private: (),
}

impl LibraryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from the dump returned by the `library` command.
    ///
    /// Missing sections produce empty collections. Only a root that is not an
    /// object, or a section that is present but not an object, is rejected.
    pub fn build(&self, dump: &Value) -> Result<LibrarySnapshot> {
        let root = dump
            .as_object()
            .ok_or_else(|| LibraryError::malformed("library dump is not a JSON object"))?;

        let library = match root.get("library") {
            Some(Value::Object(library)) => library,
            None | Some(Value::Null) => root,
            Some(_) => {
                return Err(LibraryError::malformed(
                    "\"library\" entry is not a JSON object",
                ))
            }
        };

        let tracks = match Section::read(library, "tracks")? {
            Some(section) => read_tracks(&section),
            None => Vec::new(),
        };
        let known: HashSet<TrackId> = tracks.iter().map(|t| t.id.clone()).collect();

        let albums = match Section::read(library, "albums")? {
            Some(section) => read_albums(&section, &known),
            None => Vec::new(),
        };

        let artists = match Section::read(library, "artists")? {
            Some(section) => read_artists(&section, &known),
            None => Vec::new(),
        };

        let playlists = match Section::read(library, "playlists")? {
            Some(section) => read_playlists(&section, &known),
            None => Vec::new(),
        };

        let snapshot = LibrarySnapshot::from_parts(tracks, albums, artists, playlists);

        info!(
            tracks = snapshot.track_count(),
            albums = snapshot.album_count(),
            artists = snapshot.artist_count(),
            playlists = snapshot.playlist_count(),
            "Built library snapshot"
        );

        Ok(snapshot)
    }
}

/// One section of the dump: its column map and its id-keyed rows.
struct Section<'a> {
    name: &'static str,
    columns: HashMap<&'a str, usize>,
    rows: Vec<(&'a str, &'a [Value])>,
}

impl<'a> Section<'a> {
    fn read(library: &'a Map<String, Value>, name: &'static str) -> Result<Option<Self>> {
        let entries = match library.get(name) {
            Some(Value::Object(entries)) => entries,
            None | Some(Value::Null) => {
                debug!(section = name, "Section missing from library dump");
                return Ok(None);
            }
            Some(_) => {
                return Err(LibraryError::malformed(format!(
                    "\"{}\" section is not a JSON object",
                    name
                )))
            }
        };

        // Non-numeric map entries (nested maps for extra columns) are skipped.
        let columns: HashMap<&str, usize> = entries
            .get(MAP_KEY)
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(field, index)| {
                        let index = usize::try_from(index.as_u64()?).ok()?;
                        Some((field.as_str(), index))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            if key == MAP_KEY {
                continue;
            }
            match value {
                Value::Array(cells) => rows.push((key.as_str(), cells.as_slice())),
                _ => warn!(section = name, id = %key, "Skipping row that is not an array"),
            }
        }

        debug!(section = name, rows = rows.len(), "Read library section");

        Ok(Some(Self {
            name,
            columns,
            rows,
        }))
    }

    fn column(&self, (field, default): (&str, usize)) -> usize {
        self.columns.get(field).copied().unwrap_or(default)
    }
}

fn cell(row: &[Value], index: usize) -> Option<&Value> {
    row.get(index).filter(|v| !v.is_null())
}

fn text(row: &[Value], index: usize) -> Option<String> {
    match cell(row, index)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(row: &[Value], index: usize) -> Option<i64> {
    match cell(row, index)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Foreign keys use `0` for "none".
fn reference<T: From<String>>(row: &[Value], index: usize) -> Option<T> {
    let id = text(row, index)?;
    if id.is_empty() || id == "0" {
        None
    } else {
        Some(T::from(id))
    }
}

/// Read a member list, dropping ids that do not name a known track.
fn members(
    section: &Section<'_>,
    owner: &str,
    row: &[Value],
    index: usize,
    known: &HashSet<TrackId>,
) -> Vec<TrackId> {
    let Some(Value::Array(ids)) = cell(row, index) else {
        return Vec::new();
    };

    ids.iter()
        .filter_map(|value| {
            let Some(id) = TrackId::from_json(value) else {
                warn!(section = section.name, owner = %owner, "Skipping malformed track reference");
                return None;
            };
            if known.contains(&id) {
                Some(id)
            } else {
                warn!(
                    section = section.name,
                    owner = %owner,
                    track_id = %id,
                    "Skipping reference to unknown track"
                );
                None
            }
        })
        .collect()
}

fn read_tracks(section: &Section<'_>) -> Vec<Track> {
    use track_columns::*;

    let title = section.column(TITLE);
    let album_id = section.column(ALBUM_ID);
    let artist_id = section.column(ARTIST_ID);
    let path = section.column(PATH);
    let track_number = section.column(TRACK_NUMBER);
    let year = section.column(YEAR);
    let file = section.column(FILE);

    section
        .rows
        .iter()
        .map(|(id, row)| Track {
            id: TrackId::new(*id),
            title: text(row, title).unwrap_or_default(),
            album_id: reference::<AlbumId>(row, album_id),
            artist_id: reference::<ArtistId>(row, artist_id),
            folder: text(row, path).unwrap_or_default(),
            track_number: number(row, track_number)
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0),
            year: number(row, year)
                .and_then(|n| i32::try_from(n).ok())
                .filter(|y| *y > 0),
            file_name: text(row, file).filter(|f| !f.is_empty()),
            checksum: None,
        })
        .collect()
}

fn read_albums(section: &Section<'_>, known: &HashSet<TrackId>) -> Vec<Album> {
    use album_columns::*;

    let name = section.column(NAME);
    let tracks = section.column(TRACKS);
    let artist_id = section.column(ARTIST_ID);

    section
        .rows
        .iter()
        .map(|(id, row)| Album {
            id: AlbumId::new(*id),
            name: text(row, name).unwrap_or_default(),
            artist_id: reference::<ArtistId>(row, artist_id),
            tracks: members(section, id, row, tracks, known),
        })
        .collect()
}

fn read_artists(section: &Section<'_>, known: &HashSet<TrackId>) -> Vec<Artist> {
    use artist_columns::*;

    let name = section.column(NAME);
    let tracks = section.column(TRACKS);

    section
        .rows
        .iter()
        .map(|(id, row)| Artist {
            id: ArtistId::new(*id),
            name: text(row, name).unwrap_or_default(),
            tracks: members(section, id, row, tracks, known),
        })
        .collect()
}

fn read_playlists(section: &Section<'_>, known: &HashSet<TrackId>) -> Vec<PlaylistSummary> {
    use playlist_columns::*;

    let name = section.column(NAME);
    let tracks = section.column(TRACKS);
    let description = section.column(DESCRIPTION);

    section
        .rows
        .iter()
        .map(|(id, row)| PlaylistSummary {
            id: PlaylistId::new(*id),
            name: text(row, name).unwrap_or_default(),
            description: text(row, description).filter(|d| !d.is_empty()),
            tracks: members(section, id, row, tracks, known),
        })
        .collect()
}

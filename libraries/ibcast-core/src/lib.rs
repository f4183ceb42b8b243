//! ibcast Core
//!
//! Library model and selection engine for an iBroadcast music library.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Album`, `Artist`, `PlaylistSummary` and their ids
//! - **Library Builder**: turns the loosely typed library dump into a `LibrarySnapshot`
//! - **Matching**: folder path resolution and wildcard album matching
//! - **Selection**: an ordered, de-duplicated accumulator of chosen tracks
//!
//! # Example
//!
//! ```rust
//! use ibcast_core::{LibraryBuilder, MatchPolicy, SelectionAccumulator};
//! use ibcast_core::matching::{resolve_albums, resolve_folder};
//! use serde_json::json;
//!
//! let dump = json!({
//!     "library": {
//!         "tracks": {
//!             "map": { "title": 2, "album_id": 5, "path": 12 },
//!             "1": [1, 2001, "Intro", null, 60, 10, 0, 0, "", "", false, 0, "Music/Rock"]
//!         },
//!         "albums": {
//!             "map": { "name": 0, "tracks": 1 },
//!             "10": ["Sampler Vol. 1", [1]]
//!         }
//!     }
//! });
//!
//! let snapshot = LibraryBuilder::new().build(&dump).unwrap();
//! let policy = MatchPolicy::default();
//!
//! let mut selection = SelectionAccumulator::new();
//! selection.add(resolve_folder(&snapshot, "Music/Rock", &policy));
//! selection.add(resolve_albums(&snapshot, "Sampler*", &policy));
//!
//! assert_eq!(selection.drain().len(), 1);
//! ```

#![forbid(unsafe_code)]

pub mod builder;
pub mod error;
pub mod matching;
pub mod selection;
pub mod snapshot;
pub mod types;

pub use builder::LibraryBuilder;
pub use error::{LibraryError, Result};
pub use matching::MatchPolicy;
pub use selection::{SelectionAccumulator, TrackSelection};
pub use snapshot::LibrarySnapshot;

pub use types::{
    Album, AlbumId, Artist, ArtistId, PlaylistId, PlaylistSummary, Track, TrackId,
};

mod album;
mod artist;
mod ids;
mod playlist;
mod track;

pub use album::Album;
pub use artist::Artist;
pub use ids::{AlbumId, ArtistId, PlaylistId, TrackId};
pub use playlist::PlaylistSummary;
pub use track::Track;

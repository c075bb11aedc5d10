//! Core domain types for Cadence

mod ids;
mod playlist;
mod track;
mod user;

pub use ids::{AlbumId, AuthorId, PlaylistId, TrackId, UserId};
pub use playlist::{Playlist, PlaylistKind};
pub use track::{
    MissingField, PlaceholderTrack, PlaylistEntry, RawTrack, Track, UNKNOWN_ALBUM, UNKNOWN_ARTIST,
    UNKNOWN_SONG,
};
pub use user::User;

//! Cadence Core
//!
//! Platform-agnostic domain types shared by the Cadence crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `PlaceholderTrack`, `PlaylistEntry`, `Playlist` (all songs, named,
//!   album and artist contexts), `User`
//! - **Normalization**: `RawTrack` turns loosely-shaped CMS records into playlist entries
//! - **Display helpers**: `format_duration` for `m:ss` / `--:--` rendering
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{PlaylistEntry, RawTrack};
//!
//! let raw = RawTrack {
//!     id: Some(7),
//!     name: Some("Houdini".to_string()),
//!     artists: vec!["Eminem".to_string()],
//!     album: None,
//!     audio_path: Some("/uploads/houdini.mp3".to_string()),
//!     cover_path: None,
//!     duration: None,
//! };
//!
//! let entry = raw.normalize("http://localhost:1337");
//! assert!(matches!(entry, PlaylistEntry::Track(_)));
//! assert_eq!(entry.album(), "Unknown Album");
//! assert_eq!(entry.audio_url(), Some("http://localhost:1337/uploads/houdini.mp3"));
//! ```

#![forbid(unsafe_code)]

pub mod format;
pub mod media;
pub mod types;

pub use format::{format_duration, UNKNOWN_DURATION};
pub use media::{resolve_media_url, DEFAULT_COVER_ART};
pub use types::{
    AlbumId, AuthorId, MissingField, PlaceholderTrack, Playlist, PlaylistEntry, PlaylistId,
    PlaylistKind, RawTrack, Track, TrackId, User, UserId, UNKNOWN_ALBUM, UNKNOWN_ARTIST,
    UNKNOWN_SONG,
};

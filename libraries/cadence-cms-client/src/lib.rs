//! Cadence CMS Client
//!
//! HTTP client library for the content backend that stores songs, playlists
//! and accounts (Strapi-style REST).
//!
//! # Features
//!
//! - **Songs**: list all songs, fetch one
//! - **Playlists**: list, fetch with populated songs, create, update, add/remove songs, delete
//! - **Albums and authors**: album and artist playback contexts
//! - **Authentication**: login, registration, current profile
//! - **Normalization**: wire records become `cadence_core` playlists, with placeholders for malformed rows
//!
//! # Example
//!
//! ```ignore
//! use cadence_cms_client::{ClientConfig, CmsClient, PlaylistSource};
//! use cadence_core::PlaylistId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CmsClient::new(ClientConfig::new("http://localhost:1337"))?;
//!
//!     let all_songs = client.all_songs().await?;
//!     println!("{} songs", all_songs.len());
//!
//!     let road_trip = client.playlist(PlaylistId::new(3)).await?;
//!     println!("{}: {} songs", road_trip.title(), road_trip.len());
//!
//!     Ok(())
//! }
//! ```

mod albums;
mod auth;
mod client;
mod error;
mod playlists;
mod songs;
mod source;
mod types;

// Re-export main types
pub use client::CmsClient;
pub use error::{CmsClientError, Result};
pub use source::PlaylistSource;
pub use types::{
    albums_to_artist_playlist, songs_to_playlist, AlbumAttributes, AlbumEntity, AuthResponse,
    AuthorAttributes, AuthorEntity, ClientConfig, Entity, Envelope, Media, MediaAttributes,
    NamedAttributes, PlaylistAttributes, PlaylistEntity, PlaylistInput, Relation, SongAttributes,
    SongEntity, UserPlaylist, UserPlaylistSong, UserResponse, UNTITLED_PLAYLIST,
};

// Re-export sub-clients for direct use if needed
pub use albums::AlbumsClient;
pub use auth::AuthClient;
pub use playlists::PlaylistsClient;
pub use songs::SongsClient;

//! Types for CMS requests and responses.
//!
//! The CMS speaks the Strapi v4 REST dialect: collection entries arrive as
//! `{ "id": .., "attributes": { .. } }`, relations and media are wrapped in
//! `{ "data": .. }`, and any of them may be missing or `null` depending on
//! what the query populated. Every nested field is optional here.

use cadence_core::{
    resolve_media_url, AlbumId, AuthorId, Playlist, PlaylistEntry, PlaylistId, RawTrack, TrackId,
    User, UserId, UNKNOWN_ALBUM, UNKNOWN_ARTIST,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Title used for playlists stored without one
pub const UNTITLED_PLAYLIST: &str = "Untitled Playlist";

/// Configuration for connecting to the CMS.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the CMS (e.g., "http://localhost:1337")
    pub url: String,
    /// JWT for authenticated requests
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Create a config with an existing token.
    pub fn with_token(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::new(url)
        }
    }

    /// Override the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Envelope Types
// =============================================================================

/// Top-level `{ "data": .. }` wrapper.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Collection entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entity<A> {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub attributes: A,
}

/// Populated relation; `data` is `null` when the relation is empty.
#[derive(Debug, Clone, Deserialize)]
pub struct Relation<T> {
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Default for Relation<T> {
    fn default() -> Self {
        Self { data: None }
    }
}

/// Uploaded file attributes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaAttributes {
    pub url: Option<String>,
}

/// Single media relation.
pub type Media = Relation<Entity<MediaAttributes>>;

/// Attributes of entities that only carry a name (authors, albums).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedAttributes {
    pub name: Option<String>,
}

// =============================================================================
// Songs
// =============================================================================

/// Song attributes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongAttributes {
    pub name: Option<String>,
    pub authors: Option<Relation<Vec<Entity<NamedAttributes>>>>,
    pub album: Option<Relation<Entity<NamedAttributes>>>,
    pub src: Option<Media>,
    pub cover_art: Option<Media>,
    /// Length in seconds, when stored
    pub duration: Option<f64>,
}

/// Song entry.
pub type SongEntity = Entity<SongAttributes>;

fn media_url(media: Option<&Media>) -> Option<String> {
    media
        .and_then(|media| media.data.as_ref())
        .and_then(|entity| entity.attributes.url.clone())
}

impl SongAttributes {
    /// Author names in relation order (blank names are dropped later).
    pub fn author_names(&self) -> Vec<String> {
        self.authors
            .as_ref()
            .and_then(|relation| relation.data.as_ref())
            .map(|authors| {
                authors
                    .iter()
                    .filter_map(|author| author.attributes.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn album_name(&self) -> Option<String> {
        self.album
            .as_ref()
            .and_then(|relation| relation.data.as_ref())
            .and_then(|album| album.attributes.name.clone())
    }

    pub fn audio_path(&self) -> Option<String> {
        media_url(self.src.as_ref())
    }

    pub fn cover_path(&self) -> Option<String> {
        media_url(self.cover_art.as_ref())
    }
}

impl SongEntity {
    /// Flatten into the record shape the core normalizes.
    pub fn to_raw_track(&self) -> RawTrack {
        RawTrack {
            id: self.id,
            name: self.attributes.name.clone(),
            artists: self.attributes.author_names(),
            album: self.attributes.album_name(),
            audio_path: self.attributes.audio_path(),
            cover_path: self.attributes.cover_path(),
            duration: self
                .attributes
                .duration
                .filter(|secs| *secs > 0.0)
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        }
    }
}

/// Build the default collection from a song listing.
pub fn songs_to_playlist(songs: &[SongEntity], base_url: &str) -> Playlist {
    Playlist::all_songs(
        songs
            .iter()
            .map(|song| song.to_raw_track().normalize(base_url))
            .collect(),
    )
}

// =============================================================================
// Playlists
// =============================================================================

/// Playlist attributes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistAttributes {
    pub title: Option<String>,
    /// Display artist for the whole playlist
    pub artist: Option<String>,
    pub cover_art: Option<Media>,
    pub songs: Option<Relation<Vec<SongEntity>>>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Playlist entry.
pub type PlaylistEntity = Entity<PlaylistAttributes>;

impl PlaylistEntity {
    pub fn title(&self) -> &str {
        self.attributes
            .title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(UNTITLED_PLAYLIST)
    }

    pub fn song_count(&self) -> usize {
        self.attributes
            .songs
            .as_ref()
            .and_then(|relation| relation.data.as_ref())
            .map_or(0, Vec::len)
    }

    /// Song records with playlist-level fallbacks applied
    ///
    /// A song without cover art takes the playlist cover, a song without an
    /// album takes the playlist title, and a song without authors takes the
    /// playlist artist.
    pub fn raw_tracks(&self) -> Vec<RawTrack> {
        let cover = media_url(self.attributes.cover_art.as_ref());
        let title = self.attributes.title.clone();
        let artist = self.attributes.artist.clone();

        let Some(songs) = self
            .attributes
            .songs
            .as_ref()
            .and_then(|relation| relation.data.as_ref())
        else {
            return Vec::new();
        };

        songs
            .iter()
            .map(|song| {
                let mut raw = song.to_raw_track();
                if raw.cover_path.is_none() {
                    raw.cover_path = cover.clone();
                }
                if raw.album.is_none() {
                    raw.album = title.clone();
                }
                if raw.artists.is_empty() {
                    raw.artists = artist.iter().cloned().collect();
                }
                raw
            })
            .collect()
    }

    /// Convert into a named playlist of normalized entries.
    pub fn to_playlist(&self, base_url: &str) -> Playlist {
        let entries: Vec<PlaylistEntry> = self
            .raw_tracks()
            .into_iter()
            .map(|raw| raw.normalize(base_url))
            .collect();

        Playlist::named(
            PlaylistId::new(self.id.unwrap_or_default()),
            self.title(),
            None,
            entries,
        )
    }
}

// =============================================================================
// Albums and Authors
// =============================================================================

/// Album attributes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumAttributes {
    pub name: Option<String>,
    pub authors: Option<Relation<Vec<Entity<NamedAttributes>>>>,
    pub cover_art: Option<Media>,
    pub songs: Option<Relation<Vec<SongEntity>>>,
    pub release_date: Option<String>,
}

/// Album entry.
pub type AlbumEntity = Entity<AlbumAttributes>;

impl AlbumEntity {
    pub fn title(&self) -> &str {
        self.attributes
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNKNOWN_ALBUM)
    }

    /// Name of the first credited author
    pub fn lead_author(&self) -> Option<String> {
        self.attributes
            .authors
            .as_ref()
            .and_then(|relation| relation.data.as_ref())
            .and_then(|authors| authors.first())
            .and_then(|author| author.attributes.name.clone())
    }

    /// Song records with album-level fallbacks applied
    ///
    /// A song without cover art takes the album cover, a song without an
    /// album relation takes this album's name, and a song without authors
    /// takes the album's lead author.
    pub fn raw_tracks(&self) -> Vec<RawTrack> {
        let cover = media_url(self.attributes.cover_art.as_ref());
        let author = self.lead_author();

        let Some(songs) = self
            .attributes
            .songs
            .as_ref()
            .and_then(|relation| relation.data.as_ref())
        else {
            return Vec::new();
        };

        songs
            .iter()
            .map(|song| {
                let mut raw = song.to_raw_track();
                if raw.cover_path.is_none() {
                    raw.cover_path = cover.clone();
                }
                if raw.album.is_none() {
                    raw.album = self.attributes.name.clone();
                }
                if raw.artists.is_empty() {
                    raw.artists = author.iter().cloned().collect();
                }
                raw
            })
            .collect()
    }

    /// Convert into an album playback context.
    pub fn to_playlist(&self, base_url: &str) -> Playlist {
        Playlist::album(
            AlbumId::new(self.id.unwrap_or_default()),
            self.title(),
            self.raw_tracks()
                .into_iter()
                .map(|raw| raw.normalize(base_url))
                .collect(),
        )
    }
}

/// Author attributes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorAttributes {
    pub name: Option<String>,
    pub avatar: Option<Media>,
    /// Albums without their songs
    pub albums: Option<Relation<Vec<AlbumEntity>>>,
}

/// Author entry.
pub type AuthorEntity = Entity<AuthorAttributes>;

impl AuthorEntity {
    pub fn name(&self) -> &str {
        self.attributes
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNKNOWN_ARTIST)
    }

    pub fn avatar_path(&self) -> Option<String> {
        media_url(self.attributes.avatar.as_ref())
    }

    /// Ids of the author's albums, in relation order
    pub fn album_ids(&self) -> Vec<AlbumId> {
        self.attributes
            .albums
            .as_ref()
            .and_then(|relation| relation.data.as_ref())
            .map(|albums| albums.iter().filter_map(|album| album.id).map(AlbumId::new).collect())
            .unwrap_or_default()
    }
}

/// Concatenate albums into one artist playback context.
///
/// Songs without authors are credited to the artist.
pub fn albums_to_artist_playlist(
    author: &AuthorEntity,
    albums: &[AlbumEntity],
    base_url: &str,
) -> Playlist {
    let name = author.name();
    let entries = albums
        .iter()
        .flat_map(AlbumEntity::raw_tracks)
        .map(|mut raw| {
            if raw.artists.is_empty() {
                raw.artists = vec![name.to_string()];
            }
            raw.normalize(base_url)
        })
        .collect();

    Playlist::artist(AuthorId::new(author.id.unwrap_or_default()), name, entries)
}

/// Fields for creating or updating a playlist.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlaylistInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replaces the whole song list when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub songs: Option<Vec<TrackId>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdRef {
    pub id: TrackId,
}

/// Incremental change to a playlist's song relation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RelationChange {
    Connect(Vec<IdRef>),
    Disconnect(Vec<IdRef>),
}

#[derive(Debug, Serialize)]
pub(crate) struct SongsChange {
    pub songs: RelationChange,
}

// =============================================================================
// Authentication Types
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from login and registration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub jwt: String,
    pub user: UserResponse,
}

/// Account as returned by the users endpoints (not enveloped).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub avatar: Option<MediaAttributes>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub playlists: Vec<UserPlaylist>,
}

impl UserResponse {
    /// Convert into the domain user, resolving the avatar against the CMS.
    pub fn to_user(&self, base_url: &str) -> User {
        User {
            id: UserId::new(self.id),
            username: self.username.clone(),
            email: self.email.clone(),
            avatar_url: self
                .avatar
                .as_ref()
                .and_then(|avatar| avatar.url.as_deref())
                .map(|url| resolve_media_url(base_url, url)),
            created_at: self.created_at,
        }
    }
}

/// Playlist summary nested in a user profile.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPlaylist {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub songs: Vec<UserPlaylistSong>,
}

impl UserPlaylist {
    pub fn contains(&self, song: TrackId) -> bool {
        self.songs.iter().any(|entry| entry.id == song.as_i64())
    }
}

/// Song reference nested in a user playlist.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPlaylistSong {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Error body returned by the CMS.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub message: String,
}

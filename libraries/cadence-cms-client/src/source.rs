//! Playlist source abstraction.

use crate::client::CmsClient;
use crate::error::Result;
use crate::types::{albums_to_artist_playlist, songs_to_playlist};
use async_trait::async_trait;
use cadence_core::{AlbumId, AuthorId, Playlist, PlaylistId};
use tracing::info;

/// Where playable collections come from
///
/// Returned playlists are already normalized: malformed records are
/// placeholders, never errors.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// The default "all songs" collection
    async fn all_songs(&self) -> Result<Playlist>;

    /// A named playlist
    async fn playlist(&self, id: PlaylistId) -> Result<Playlist>;

    /// An album's songs in album order
    async fn album(&self, id: AlbumId) -> Result<Playlist>;

    /// Every song on an author's albums
    async fn artist(&self, id: AuthorId) -> Result<Playlist>;
}

#[async_trait]
impl PlaylistSource for CmsClient {
    async fn all_songs(&self) -> Result<Playlist> {
        let songs = self.songs().await.list().await?;
        let playlist = songs_to_playlist(&songs, self.url());

        let placeholders = playlist.entries.iter().filter(|e| e.is_placeholder()).count();
        info!(songs = playlist.len(), placeholders, "Loaded all songs");
        Ok(playlist)
    }

    async fn playlist(&self, id: PlaylistId) -> Result<Playlist> {
        let entity = self.playlists().await.get(id).await?;
        let playlist = entity.to_playlist(self.url());

        info!(playlist_id = %id, title = %playlist.title(), songs = playlist.len(), "Loaded playlist");
        Ok(playlist)
    }

    async fn album(&self, id: AlbumId) -> Result<Playlist> {
        let entity = self.albums().await.get(id).await?;
        let playlist = entity.to_playlist(self.url());

        info!(album_id = %id, title = %playlist.title(), songs = playlist.len(), "Loaded album");
        Ok(playlist)
    }

    async fn artist(&self, id: AuthorId) -> Result<Playlist> {
        let albums_client = self.albums().await;
        let author = albums_client.author(id).await?;

        let mut albums = Vec::new();
        for album_id in author.album_ids() {
            albums.push(albums_client.get(album_id).await?);
        }
        let playlist = albums_to_artist_playlist(&author, &albums, self.url());

        info!(
            author_id = %id,
            name = %playlist.title(),
            albums = albums.len(),
            songs = playlist.len(),
            "Loaded artist"
        );
        Ok(playlist)
    }
}

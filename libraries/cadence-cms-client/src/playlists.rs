//! Playlist endpoints.

use crate::client::{authorize, error_from_response, read_json, send};
use crate::error::{CmsClientError, Result};
use crate::types::{
    Envelope, IdRef, PlaylistEntity, PlaylistInput, RelationChange, SongsChange,
};
use cadence_core::{PlaylistId, TrackId};
use reqwest::Client;
use tracing::{debug, info};

/// Query that populates every song relation plus the playlist cover
const DETAIL_QUERY: &str =
    "populate[songs][populate]=coverArt,authors,album,src&populate[coverArt]=*";

/// Playlist client.
///
/// Mutations require a token; ownership checks are the CMS's business.
pub struct PlaylistsClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    token: Option<String>,
}

impl<'a> PlaylistsClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, token: Option<String>) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    fn require_token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(CmsClientError::AuthRequired)
    }

    /// Every playlist (songs populated one level deep).
    pub async fn list(&self) -> Result<Vec<PlaylistEntity>> {
        let url = format!("{}/api/playlists?populate=*", self.base_url);
        debug!(url = %url, "Fetching playlists");

        let response = send(authorize(self.http.get(&url), self.token.as_deref())).await?;
        let playlists: Envelope<Vec<PlaylistEntity>> = read_json(response, "playlists").await?;

        debug!(playlists = playlists.data.len(), "Fetched playlists");
        Ok(playlists.data)
    }

    /// A playlist with its songs fully populated.
    pub async fn get(&self, id: PlaylistId) -> Result<PlaylistEntity> {
        let url = format!("{}/api/playlists/{}?{}", self.base_url, id, DETAIL_QUERY);
        debug!(url = %url, playlist_id = %id, "Fetching playlist");

        let response = send(authorize(self.http.get(&url), self.token.as_deref())).await?;
        let playlist: Envelope<PlaylistEntity> =
            read_json(response, &format!("playlist {}", id)).await?;

        debug!(
            playlist_id = %id,
            songs = playlist.data.song_count(),
            "Fetched playlist"
        );
        Ok(playlist.data)
    }

    /// Create a playlist.
    pub async fn create(&self, input: &PlaylistInput) -> Result<PlaylistEntity> {
        let token = self.require_token()?;
        let url = format!("{}/api/playlists", self.base_url);
        debug!(url = %url, title = ?input.title, "Creating playlist");

        let response = send(
            self.http
                .post(&url)
                .bearer_auth(token)
                .json(&Envelope { data: input }),
        )
        .await?;
        let created: Envelope<PlaylistEntity> = read_json(response, "playlist").await?;

        info!(playlist_id = ?created.data.id, title = %created.data.title(), "Created playlist");
        Ok(created.data)
    }

    /// Update title and/or replace the song list.
    pub async fn update(&self, id: PlaylistId, input: &PlaylistInput) -> Result<PlaylistEntity> {
        let token = self.require_token()?;
        let url = format!("{}/api/playlists/{}", self.base_url, id);
        debug!(url = %url, playlist_id = %id, "Updating playlist");

        let response = send(
            self.http
                .put(&url)
                .bearer_auth(token)
                .json(&Envelope { data: input }),
        )
        .await?;
        let updated: Envelope<PlaylistEntity> =
            read_json(response, &format!("playlist {}", id)).await?;
        Ok(updated.data)
    }

    /// Append a song without touching the rest of the list.
    pub async fn add_song(&self, id: PlaylistId, song: TrackId) -> Result<()> {
        self.change_songs(id, RelationChange::Connect(vec![IdRef { id: song }]))
            .await
    }

    /// Remove a song without touching the rest of the list.
    pub async fn remove_song(&self, id: PlaylistId, song: TrackId) -> Result<()> {
        self.change_songs(id, RelationChange::Disconnect(vec![IdRef { id: song }]))
            .await
    }

    async fn change_songs(&self, id: PlaylistId, change: RelationChange) -> Result<()> {
        let token = self.require_token()?;
        let url = format!("{}/api/playlists/{}", self.base_url, id);
        debug!(url = %url, playlist_id = %id, change = ?change, "Changing playlist songs");

        let response = send(
            self.http
                .put(&url)
                .bearer_auth(token)
                .json(&Envelope {
                    data: SongsChange { songs: change },
                }),
        )
        .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response, &format!("playlist {}", id)).await)
        }
    }

    /// Delete a playlist.
    pub async fn delete(&self, id: PlaylistId) -> Result<()> {
        let token = self.require_token()?;
        let url = format!("{}/api/playlists/{}", self.base_url, id);
        debug!(url = %url, playlist_id = %id, "Deleting playlist");

        let response = send(self.http.delete(&url).bearer_auth(token)).await?;
        let status = response.status();

        if status.is_success() {
            info!(playlist_id = %id, "Playlist deleted");
            Ok(())
        } else if status.as_u16() == 404 {
            // Already deleted, that's fine
            Ok(())
        } else {
            Err(error_from_response(response, &format!("playlist {}", id)).await)
        }
    }
}

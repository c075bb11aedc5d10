//! Song endpoints.

use crate::client::{authorize, read_json, send};
use crate::error::Result;
use crate::types::{Envelope, SongEntity};
use cadence_core::TrackId;
use reqwest::Client;
use tracing::debug;

/// Song client.
pub struct SongsClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    token: Option<String>,
}

impl<'a> SongsClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, token: Option<String>) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// Every song with all relations populated.
    pub async fn list(&self) -> Result<Vec<SongEntity>> {
        let url = format!("{}/api/songs?populate=*", self.base_url);
        debug!(url = %url, "Fetching songs");

        let response = send(authorize(self.http.get(&url), self.token.as_deref())).await?;
        let songs: Envelope<Vec<SongEntity>> = read_json(response, "songs").await?;

        debug!(songs = songs.data.len(), "Fetched songs");
        Ok(songs.data)
    }

    /// A single song by id.
    pub async fn get(&self, id: TrackId) -> Result<SongEntity> {
        let url = format!("{}/api/songs/{}?populate=*", self.base_url, id);
        debug!(url = %url, song_id = %id, "Fetching song");

        let response = send(authorize(self.http.get(&url), self.token.as_deref())).await?;
        let song: Envelope<SongEntity> = read_json(response, &format!("song {}", id)).await?;
        Ok(song.data)
    }
}

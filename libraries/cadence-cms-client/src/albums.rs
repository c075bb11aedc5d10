//! Album and author endpoints.

use crate::client::{authorize, read_json, send};
use crate::error::Result;
use crate::types::{AlbumEntity, AuthorEntity, Envelope};
use cadence_core::{AlbumId, AuthorId};
use reqwest::Client;
use tracing::debug;

/// Album with its authors, cover and fully populated songs
const ALBUM_QUERY: &str =
    "populate=authors,coverArt,songs.coverArt,songs.url,songs.album,songs.src,songs.authors";

/// Author with avatar and album summaries (no songs)
const AUTHOR_QUERY: &str = "populate=avatar,albums.coverArt";

/// Album and author client.
pub struct AlbumsClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    token: Option<String>,
}

impl<'a> AlbumsClient<'a> {
    pub(crate) fn new(http: &'a Client, base_url: &'a str, token: Option<String>) -> Self {
        Self {
            http,
            base_url,
            token,
        }
    }

    /// An album with its songs.
    pub async fn get(&self, id: AlbumId) -> Result<AlbumEntity> {
        let url = format!("{}/api/albums/{}?{}", self.base_url, id, ALBUM_QUERY);
        debug!(url = %url, album_id = %id, "Fetching album");

        let response = send(authorize(self.http.get(&url), self.token.as_deref())).await?;
        let album: Envelope<AlbumEntity> = read_json(response, &format!("album {}", id)).await?;
        Ok(album.data)
    }

    /// An author and the albums credited to them.
    pub async fn author(&self, id: AuthorId) -> Result<AuthorEntity> {
        let url = format!("{}/api/authors/{}?{}", self.base_url, id, AUTHOR_QUERY);
        debug!(url = %url, author_id = %id, "Fetching author");

        let response = send(authorize(self.http.get(&url), self.token.as_deref())).await?;
        let author: Envelope<AuthorEntity> =
            read_json(response, &format!("author {}", id)).await?;

        debug!(
            author_id = %id,
            albums = author.data.album_ids().len(),
            "Fetched author"
        );
        Ok(author.data)
    }
}

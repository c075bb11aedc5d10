/// Playlist domain types
use crate::types::{AlbumId, AuthorId, PlaylistEntry, PlaylistId, TrackId, UserId};
use serde::{Deserialize, Serialize};

/// Where a playlist came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaylistKind {
    /// The default "all songs" collection
    AllSongs,

    /// A user-curated collection stored in the CMS
    Named {
        id: PlaylistId,
        title: String,
        /// Owning account (ownership is enforced by the CMS)
        owner: Option<UserId>,
    },

    /// An album's songs in album order
    Album { id: AlbumId, title: String },

    /// Every song on an author's albums, album by album
    Artist { id: AuthorId, name: String },

    /// Any other ordered sequence
    Adhoc,
}

/// Ordered sequence of playlist entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub kind: PlaylistKind,
    pub entries: Vec<PlaylistEntry>,
}

impl Playlist {
    /// Create the default collection
    pub fn all_songs(entries: Vec<PlaylistEntry>) -> Self {
        Self {
            kind: PlaylistKind::AllSongs,
            entries,
        }
    }

    /// Create a named, user-owned playlist
    pub fn named(
        id: PlaylistId,
        title: impl Into<String>,
        owner: Option<UserId>,
        entries: Vec<PlaylistEntry>,
    ) -> Self {
        Self {
            kind: PlaylistKind::Named {
                id,
                title: title.into(),
                owner,
            },
            entries,
        }
    }

    /// Create an album playback context
    pub fn album(id: AlbumId, title: impl Into<String>, entries: Vec<PlaylistEntry>) -> Self {
        Self {
            kind: PlaylistKind::Album {
                id,
                title: title.into(),
            },
            entries,
        }
    }

    /// Create an artist playback context
    pub fn artist(id: AuthorId, name: impl Into<String>, entries: Vec<PlaylistEntry>) -> Self {
        Self {
            kind: PlaylistKind::Artist {
                id,
                name: name.into(),
            },
            entries,
        }
    }

    /// Create an anonymous playlist
    pub fn adhoc(entries: Vec<PlaylistEntry>) -> Self {
        Self {
            kind: PlaylistKind::Adhoc,
            entries,
        }
    }

    /// An empty anonymous playlist
    pub fn empty() -> Self {
        Self::adhoc(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    /// Display title of the playlist
    pub fn title(&self) -> &str {
        match &self.kind {
            PlaylistKind::AllSongs => "All Songs",
            PlaylistKind::Named { title, .. } | PlaylistKind::Album { title, .. } => title,
            PlaylistKind::Artist { name, .. } => name,
            PlaylistKind::Adhoc => "Now Playing",
        }
    }

    /// Track ids in order (`None` for placeholders without an id)
    pub fn track_ids(&self) -> Vec<Option<TrackId>> {
        self.entries.iter().map(PlaylistEntry::id).collect()
    }
}

impl Default for Playlist {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<PlaylistEntry>> for Playlist {
    fn from(entries: Vec<PlaylistEntry>) -> Self {
        Self::adhoc(entries)
    }
}

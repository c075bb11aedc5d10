/// Track domain types
use crate::media::{resolve_media_url, DEFAULT_COVER_ART};
use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Title shown for a record without a usable name
pub const UNKNOWN_SONG: &str = "Unknown Song";

/// Artist shown for a record without authors
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Album shown for a record without an album relation
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// A fully described, playable track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// CMS song id
    pub id: TrackId,

    /// Song title
    pub title: String,

    /// Author names joined for display
    pub artist: String,

    /// Album name (`Unknown Album` when the song has none)
    pub album: String,

    /// Absolute audio URL
    pub audio_url: String,

    /// Absolute cover art URL, or the default cover
    pub cover_art: String,

    /// Duration when the CMS already knows it; otherwise probed lazily
    pub duration: Option<Duration>,
}

impl Track {
    /// Create a track with default album and cover art
    pub fn new(
        id: TrackId,
        title: impl Into<String>,
        artist: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            artist: artist.into(),
            album: UNKNOWN_ALBUM.to_string(),
            audio_url: audio_url.into(),
            cover_art: DEFAULT_COVER_ART.to_string(),
            duration: None,
        }
    }

    /// Set the album name
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    /// Set the cover art URL
    pub fn with_cover_art(mut self, cover_art: impl Into<String>) -> Self {
        self.cover_art = cover_art.into();
        self
    }

    /// Set a known duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Field that was absent or blank in a source record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingField {
    /// No song id
    Id,
    /// No song name
    Title,
    /// No author relation
    Artists,
    /// No audio upload
    AudioSource,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissingField::Id => "id",
            MissingField::Title => "title",
            MissingField::Artists => "artists",
            MissingField::AudioSource => "audio source",
        };
        f.write_str(name)
    }
}

/// Stand-in for a malformed record
///
/// Keeps whatever the record did provide and fills the rest with the
/// `Unknown ...` defaults, so a single bad row never fails a whole playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderTrack {
    pub id: Option<TrackId>,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// May still be present when only metadata was missing
    pub audio_url: Option<String>,
    pub cover_art: String,
    /// What made the record malformed (never empty)
    pub missing: Vec<MissingField>,
}

/// One slot of a loaded playlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaylistEntry {
    /// Well-formed track
    Track(Track),
    /// Malformed record replaced by defaults
    Placeholder(PlaceholderTrack),
}

impl PlaylistEntry {
    pub fn id(&self) -> Option<TrackId> {
        match self {
            PlaylistEntry::Track(track) => Some(track.id),
            PlaylistEntry::Placeholder(placeholder) => placeholder.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            PlaylistEntry::Track(track) => &track.title,
            PlaylistEntry::Placeholder(placeholder) => &placeholder.title,
        }
    }

    pub fn artist(&self) -> &str {
        match self {
            PlaylistEntry::Track(track) => &track.artist,
            PlaylistEntry::Placeholder(placeholder) => &placeholder.artist,
        }
    }

    pub fn album(&self) -> &str {
        match self {
            PlaylistEntry::Track(track) => &track.album,
            PlaylistEntry::Placeholder(placeholder) => &placeholder.album,
        }
    }

    /// Audio URL, if the entry has anything to play
    pub fn audio_url(&self) -> Option<&str> {
        match self {
            PlaylistEntry::Track(track) => Some(&track.audio_url),
            PlaylistEntry::Placeholder(placeholder) => placeholder.audio_url.as_deref(),
        }
    }

    pub fn cover_art(&self) -> &str {
        match self {
            PlaylistEntry::Track(track) => &track.cover_art,
            PlaylistEntry::Placeholder(placeholder) => &placeholder.cover_art,
        }
    }

    /// Duration carried in from the source record, if any
    pub fn known_duration(&self) -> Option<Duration> {
        match self {
            PlaylistEntry::Track(track) => track.duration,
            PlaylistEntry::Placeholder(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, PlaylistEntry::Placeholder(_))
    }
}

impl From<Track> for PlaylistEntry {
    fn from(track: Track) -> Self {
        PlaylistEntry::Track(track)
    }
}

impl From<PlaceholderTrack> for PlaylistEntry {
    fn from(placeholder: PlaceholderTrack) -> Self {
        PlaylistEntry::Placeholder(placeholder)
    }
}

/// Flat song record as extracted from the CMS
///
/// Every field is optional because nested CMS relations may be absent or
/// unpopulated. Media paths are relative to the CMS origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTrack {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub audio_path: Option<String>,
    pub cover_path: Option<String>,
    /// Length, when the CMS stores one
    pub duration: Option<Duration>,
}

impl RawTrack {
    /// Turn the record into a playlist entry
    ///
    /// Records with an id, a name, at least one author and an audio upload
    /// become [`Track`]s. Anything else becomes a [`PlaceholderTrack`] and is
    /// logged; this never fails.
    pub fn normalize(self, base_url: &str) -> PlaylistEntry {
        let title = non_blank(self.name);
        let artists: Vec<String> = self
            .artists
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let artist = (!artists.is_empty()).then(|| artists.join(", "));
        let album = non_blank(self.album).unwrap_or_else(|| UNKNOWN_ALBUM.to_string());
        let audio_url = non_blank(self.audio_path).map(|path| resolve_media_url(base_url, &path));
        let cover_art = non_blank(self.cover_path)
            .map(|path| resolve_media_url(base_url, &path))
            .unwrap_or_else(|| DEFAULT_COVER_ART.to_string());
        let id = self.id.map(TrackId::new);
        let duration = self.duration;

        match (id, title, artist, audio_url) {
            (Some(id), Some(title), Some(artist), Some(audio_url)) => PlaylistEntry::Track(Track {
                id,
                title,
                artist,
                album,
                audio_url,
                cover_art,
                duration,
            }),
            (id, title, artist, audio_url) => {
                let mut missing = Vec::new();
                if id.is_none() {
                    missing.push(MissingField::Id);
                }
                if title.is_none() {
                    missing.push(MissingField::Title);
                }
                if artist.is_none() {
                    missing.push(MissingField::Artists);
                }
                if audio_url.is_none() {
                    missing.push(MissingField::AudioSource);
                }

                warn!(
                    track_id = ?id,
                    missing = ?missing,
                    "Malformed song record, substituting placeholder"
                );

                PlaylistEntry::Placeholder(PlaceholderTrack {
                    id,
                    title: title.unwrap_or_else(|| UNKNOWN_SONG.to_string()),
                    artist: artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
                    album,
                    audio_url,
                    cover_art,
                    missing,
                })
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:1337";

    fn complete_raw() -> RawTrack {
        RawTrack {
            id: Some(1),
            name: Some("See You Again".to_string()),
            artists: vec!["Wiz Khalifa".to_string(), "Charlie Puth".to_string()],
            album: Some("Furious 7".to_string()),
            audio_path: Some("/uploads/see_you_again.mp3".to_string()),
            cover_path: Some("/uploads/f7.jpg".to_string()),
            duration: None,
        }
    }

    #[test]
    fn complete_record_becomes_track() {
        let entry = complete_raw().normalize(BASE);

        let PlaylistEntry::Track(track) = entry else {
            panic!("expected a track");
        };
        assert_eq!(track.id, TrackId::new(1));
        assert_eq!(track.artist, "Wiz Khalifa, Charlie Puth");
        assert_eq!(track.album, "Furious 7");
        assert_eq!(track.audio_url, "http://localhost:1337/uploads/see_you_again.mp3");
        assert_eq!(track.cover_art, "http://localhost:1337/uploads/f7.jpg");
        assert_eq!(track.duration, None);
    }

    #[test]
    fn missing_album_and_cover_use_defaults_without_placeholder() {
        let raw = RawTrack {
            album: None,
            cover_path: None,
            ..complete_raw()
        };

        let entry = raw.normalize(BASE);
        assert!(!entry.is_placeholder());
        assert_eq!(entry.album(), UNKNOWN_ALBUM);
        assert_eq!(entry.cover_art(), DEFAULT_COVER_ART);
    }

    #[test]
    fn missing_name_becomes_placeholder() {
        let raw = RawTrack {
            name: None,
            ..complete_raw()
        };

        let entry = raw.normalize(BASE);
        let PlaylistEntry::Placeholder(placeholder) = &entry else {
            panic!("expected a placeholder");
        };
        assert_eq!(placeholder.title, UNKNOWN_SONG);
        assert_eq!(placeholder.missing, vec![MissingField::Title]);
        // Still playable: only metadata was missing
        assert_eq!(
            entry.audio_url(),
            Some("http://localhost:1337/uploads/see_you_again.mp3")
        );
    }

    #[test]
    fn blank_fields_count_as_missing() {
        let raw = RawTrack {
            name: Some("   ".to_string()),
            artists: vec![String::new()],
            audio_path: Some(String::new()),
            ..complete_raw()
        };

        let PlaylistEntry::Placeholder(placeholder) = raw.normalize(BASE) else {
            panic!("expected a placeholder");
        };
        assert_eq!(
            placeholder.missing,
            vec![
                MissingField::Title,
                MissingField::Artists,
                MissingField::AudioSource
            ]
        );
        assert_eq!(placeholder.artist, UNKNOWN_ARTIST);
        assert_eq!(placeholder.audio_url, None);
    }

    #[test]
    fn empty_record_is_all_defaults() {
        let entry = RawTrack::default().normalize(BASE);

        assert!(entry.is_placeholder());
        assert_eq!(entry.id(), None);
        assert_eq!(entry.title(), UNKNOWN_SONG);
        assert_eq!(entry.artist(), UNKNOWN_ARTIST);
        assert_eq!(entry.album(), UNKNOWN_ALBUM);
        assert_eq!(entry.cover_art(), DEFAULT_COVER_ART);
        assert_eq!(entry.audio_url(), None);
    }

    #[test]
    fn track_builder_defaults() {
        let track = Track::new(TrackId::new(5), "Song", "Artist", "http://x/a.mp3")
            .with_duration(Duration::from_secs(10));

        assert_eq!(track.album, UNKNOWN_ALBUM);
        assert_eq!(track.cover_art, DEFAULT_COVER_ART);

        let entry = PlaylistEntry::from(track);
        assert_eq!(entry.known_duration(), Some(Duration::from_secs(10)));
    }
}

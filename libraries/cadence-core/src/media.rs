//! Media URL helpers
//!
//! The CMS hands out upload paths relative to its own origin
//! (`/uploads/song_1234.mp3`). Playback and artwork need absolute URLs.

/// Cover art used when a track has none
pub const DEFAULT_COVER_ART: &str = "/default-cover.jpg";

/// Resolve a CMS media path against the CMS base URL
///
/// Absolute `http://` / `https://` URLs are returned unchanged. Relative paths
/// are joined with exactly one `/` between base and path.
pub fn resolve_media_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

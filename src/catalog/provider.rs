use thiserror::Error;

use super::model::{Album, Playlist, Track};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),

    #[error("catalog responded {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed catalog data: {0}")]
    Decode(String),

    #[error("catalog file error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CatalogError::Decode(e.to_string())
        } else {
            CatalogError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e.to_string())
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(e: toml::de::Error) -> Self {
        CatalogError::Decode(e.to_string())
    }
}

/// Read/write access to albums, tracks and playlists.
///
/// Implementations are shared across the event loop and worker threads, so every
/// call is expected to be atomic on its own; there are no multi-call transactions.
pub trait DataProvider: Send + Sync {
    fn list_albums(&self) -> Result<Vec<Album>, CatalogError>;

    /// `Ok(None)` when no album has this id.
    fn get_album(&self, id: u64) -> Result<Option<Album>, CatalogError>;

    fn list_tracks(&self) -> Result<Vec<Track>, CatalogError>;

    /// `Ok(None)` when no track has this id.
    fn get_track(&self, id: u64) -> Result<Option<Track>, CatalogError>;

    fn tracks_by_album(&self, album_id: u64) -> Result<Vec<Track>, CatalogError>;

    /// Tracks whose title or artist contains `query`, ignoring case.
    fn search_tracks(&self, query: &str) -> Result<Vec<Track>, CatalogError>;

    /// Bump the play counter of `track_id`. Unknown ids are ignored.
    fn increment_play_count(&self, track_id: u64) -> Result<(), CatalogError>;

    fn list_playlists(&self) -> Result<Vec<Playlist>, CatalogError>;
}

/// Case-insensitive substring match on title or artist.
pub fn track_matches(track: &Track, query_lower: &str) -> bool {
    track.title.to_lowercase().contains(query_lower)
        || track.artist.to_lowercase().contains(query_lower)
}

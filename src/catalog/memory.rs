use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Deserialize;

#[cfg(test)]
use super::model::NewPlaylist;
use super::model::{Album, NewAlbum, NewTrack, Playlist, Track};
use super::provider::{CatalogError, DataProvider, track_matches};
use super::seed;

#[derive(Debug, Default)]
struct CatalogState {
    albums: BTreeMap<u64, Album>,
    tracks: BTreeMap<u64, Track>,
    playlists: BTreeMap<u64, Playlist>,
    next_album_id: u64,
    next_track_id: u64,
    next_playlist_id: u64,
}

impl CatalogState {
    fn new() -> Self {
        Self {
            next_album_id: 1,
            next_track_id: 1,
            next_playlist_id: 1,
            ..Self::default()
        }
    }

    fn insert_album(&mut self, album: Album) {
        self.next_album_id = self.next_album_id.max(album.id + 1);
        self.albums.insert(album.id, album);
    }

    fn insert_track(&mut self, track: Track) {
        self.next_track_id = self.next_track_id.max(track.id + 1);
        self.tracks.insert(track.id, track);
    }

    fn insert_playlist(&mut self, playlist: Playlist) {
        self.next_playlist_id = self.next_playlist_id.max(playlist.id + 1);
        self.playlists.insert(playlist.id, playlist);
    }
}

/// On-disk shape of a catalog file (`catalog.source = "file"`).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogFile {
    albums: Vec<Album>,
    tracks: Vec<Track>,
    playlists: Vec<Playlist>,
}

/// Map-backed catalog. Reads return records in id order.
#[derive(Debug)]
pub struct MemoryCatalog {
    state: Mutex<CatalogState>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CatalogState::new()),
        }
    }

    /// The built-in demo catalog: four albums and six tracks.
    pub fn seeded() -> Self {
        let catalog = Self::new();
        seed::populate(&catalog);
        catalog
    }

    /// Build a catalog from records that already carry their ids.
    pub fn from_records(albums: Vec<Album>, tracks: Vec<Track>, playlists: Vec<Playlist>) -> Self {
        let mut state = CatalogState::new();
        for album in albums {
            state.insert_album(album);
        }
        for track in tracks {
            state.insert_track(track);
        }
        for playlist in playlists {
            state.insert_playlist(playlist);
        }
        Self {
            state: Mutex::new(state),
        }
    }

    /// Load a TOML catalog with `[[albums]]`, `[[tracks]]` and `[[playlists]]` tables.
    pub fn from_toml_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;
        Ok(Self::from_records(file.albums, file.tracks, file.playlists))
    }

    fn state(&self) -> MutexGuard<'_, CatalogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_album(&self, new: NewAlbum) -> Album {
        let mut state = self.state();
        let album = Album {
            id: state.next_album_id,
            title: new.title,
            artist: new.artist,
            cover_url: new.cover_url,
            release_year: new.release_year,
        };
        state.insert_album(album.clone());
        album
    }

    pub fn create_track(&self, new: NewTrack) -> Track {
        let mut state = self.state();
        let track = Track {
            id: state.next_track_id,
            title: new.title,
            artist: new.artist,
            album_id: new.album_id,
            duration: new.duration,
            audio_url: new.audio_url,
            cover_url: new.cover_url,
            play_count: 0,
        };
        state.insert_track(track.clone());
        track
    }

    #[cfg(test)]
    pub fn create_playlist(&self, new: NewPlaylist) -> Playlist {
        let mut state = self.state();
        let playlist = Playlist {
            id: state.next_playlist_id,
            title: new.title,
            user_id: new.user_id,
            cover_url: new.cover_url,
        };
        state.insert_playlist(playlist.clone());
        playlist
    }

    /// Seed helper: insert a track and overwrite its starting play count.
    pub(super) fn create_track_with_plays(&self, new: NewTrack, play_count: u64) -> Track {
        let mut track = self.create_track(new);
        if let Some(stored) = self.state().tracks.get_mut(&track.id) {
            stored.play_count = play_count;
        }
        track.play_count = play_count;
        track
    }
}

impl DataProvider for MemoryCatalog {
    fn list_albums(&self) -> Result<Vec<Album>, CatalogError> {
        Ok(self.state().albums.values().cloned().collect())
    }

    fn get_album(&self, id: u64) -> Result<Option<Album>, CatalogError> {
        Ok(self.state().albums.get(&id).cloned())
    }

    fn list_tracks(&self) -> Result<Vec<Track>, CatalogError> {
        Ok(self.state().tracks.values().cloned().collect())
    }

    fn get_track(&self, id: u64) -> Result<Option<Track>, CatalogError> {
        Ok(self.state().tracks.get(&id).cloned())
    }

    fn tracks_by_album(&self, album_id: u64) -> Result<Vec<Track>, CatalogError> {
        Ok(self
            .state()
            .tracks
            .values()
            .filter(|t| t.album_id == Some(album_id))
            .cloned()
            .collect())
    }

    fn search_tracks(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        let query_lower = query.to_lowercase();
        Ok(self
            .state()
            .tracks
            .values()
            .filter(|t| track_matches(t, &query_lower))
            .cloned()
            .collect())
    }

    fn increment_play_count(&self, track_id: u64) -> Result<(), CatalogError> {
        if let Some(track) = self.state().tracks.get_mut(&track_id) {
            track.play_count = track.play_count.saturating_add(1);
        }
        Ok(())
    }

    fn list_playlists(&self) -> Result<Vec<Playlist>, CatalogError> {
        Ok(self.state().playlists.values().cloned().collect())
    }
}

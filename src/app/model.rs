//! Application model: what the list shows, what is selected, and the
//! search box.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Instant;

use crate::audio::PlaybackSession;
use crate::catalog::{Album, CatalogError, DataProvider, Track};
use crate::search::SearchController;

/// Which list the main pane shows when no search is active.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Tracks,
    Albums,
    /// Tracks of one album, once they have been fetched.
    AlbumTracks { album: Album, tracks: Vec<Track> },
}

#[derive(Debug)]
struct AlbumLoad {
    seq: u64,
    album: Album,
    outcome: Result<Vec<Track>, CatalogError>,
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub albums: Vec<Album>,
    pub view: View,
    /// Index into the visible list.
    pub selected: usize,
    pub search: SearchController,
    /// True while keystrokes go to the search box.
    pub search_mode: bool,
    /// Where the catalog came from, for the header.
    pub source_label: String,

    provider: Arc<dyn DataProvider>,
    /// `error_seq` of the error the user dismissed.
    dismissed_error: Option<u64>,
    album_seq: u64,
    album_tx: Sender<AlbumLoad>,
    album_rx: Receiver<AlbumLoad>,
}

impl App {
    pub fn new(
        provider: Arc<dyn DataProvider>,
        search: SearchController,
        source_label: impl Into<String>,
    ) -> Self {
        let (album_tx, album_rx) = mpsc::channel();
        Self {
            tracks: Vec::new(),
            albums: Vec::new(),
            view: View::Tracks,
            selected: 0,
            search,
            search_mode: false,
            source_label: source_label.into(),
            provider,
            dismissed_error: None,
            album_seq: 0,
            album_tx,
            album_rx,
        }
    }

    /// Fetch the track and album lists. Failures leave the list empty.
    pub fn load_catalog(&mut self) {
        self.tracks = self.provider.list_tracks().unwrap_or_else(|e| {
            log::warn!("could not list tracks: {e}");
            Vec::new()
        });
        self.albums = self.provider.list_albums().unwrap_or_else(|e| {
            log::warn!("could not list albums: {e}");
            Vec::new()
        });
        log::info!(
            "catalog: {} tracks, {} albums",
            self.tracks.len(),
            self.albums.len()
        );
        self.clamp_selection();
    }

    /// True when the list shows albums rather than tracks.
    pub fn showing_albums(&self) -> bool {
        !self.search.has_query() && self.view == View::Albums
    }

    /// Tracks in the list, in display order. Empty while showing albums.
    pub fn visible_tracks(&self) -> &[Track] {
        if self.search.has_query() {
            return self.search.results();
        }
        match &self.view {
            View::Tracks => self.tracks.as_slice(),
            View::Albums => &[],
            View::AlbumTracks { tracks, .. } => tracks.as_slice(),
        }
    }

    pub fn visible_len(&self) -> usize {
        if self.showing_albums() {
            self.albums.len()
        } else {
            self.visible_tracks().len()
        }
    }

    pub fn selected_track(&self) -> Option<&Track> {
        if self.showing_albums() {
            return None;
        }
        self.visible_tracks().get(self.selected)
    }

    pub fn selected_album(&self) -> Option<&Album> {
        if !self.showing_albums() {
            return None;
        }
        self.albums.get(self.selected)
    }

    /// Title for the list pane.
    pub fn list_title(&self) -> String {
        if self.search.has_query() {
            let suffix = if self.search.is_loading() { " …" } else { "" };
            return format!(" Search: {}{suffix} ", self.search.query().trim());
        }
        match &self.view {
            View::Tracks => " Tracks ".to_string(),
            View::Albums => " Albums ".to_string(),
            View::AlbumTracks { album, .. } => format!(" {} ({}) ", album.title, album.artist),
        }
    }

    /// Move selection down, wrapping to the top.
    pub fn next(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1) % len;
    }

    /// Move selection up, wrapping to the bottom.
    pub fn prev(&mut self) {
        let len = self.visible_len();
        if len == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            len - 1
        } else {
            self.selected - 1
        };
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Switch between the track and album lists.
    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            View::Tracks => View::Albums,
            View::Albums | View::AlbumTracks { .. } => View::Tracks,
        };
        // An album still loading should not pull the view back.
        self.album_seq += 1;
        self.selected = 0;
    }

    /// Leave an album's track list for the album list.
    pub fn back(&mut self) {
        if let View::AlbumTracks { .. } = self.view {
            self.view = View::Albums;
            self.selected = 0;
        }
    }

    /// Fetch the selected album's tracks on a worker thread.
    pub fn open_selected_album(&mut self) {
        let Some(album) = self.selected_album().cloned() else {
            return;
        };
        self.album_seq += 1;
        let seq = self.album_seq;
        let provider = Arc::clone(&self.provider);
        let tx = self.album_tx.clone();
        thread::spawn(move || {
            let outcome = provider.tracks_by_album(album.id);
            let _ = tx.send(AlbumLoad {
                seq,
                album,
                outcome,
            });
        });
    }

    /// Apply finished background work. Returns true when the list changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut changed = self.search.poll(now);
        while let Ok(load) = self.album_rx.try_recv() {
            if load.seq != self.album_seq {
                continue;
            }
            let tracks = load.outcome.unwrap_or_else(|e| {
                log::warn!("could not load album '{}': {e}", load.album.title);
                Vec::new()
            });
            self.view = View::AlbumTracks {
                album: load.album,
                tracks,
            };
            self.selected = 0;
            changed = true;
        }
        if changed {
            self.clamp_selection();
        }
        changed
    }

    pub fn enter_search_mode(&mut self) {
        self.search_mode = true;
    }

    /// Stop typing into the search box but keep its results on screen.
    pub fn exit_search_mode(&mut self) {
        self.search_mode = false;
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        let mut query = self.search.query().to_string();
        query.push(c);
        self.search.set_query(&query, now);
        self.selected = 0;
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        let mut query = self.search.query().to_string();
        query.pop();
        self.search.set_query(&query, now);
        self.selected = 0;
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
        self.search_mode = false;
        self.selected = 0;
    }

    /// The error to show, unless the user already dismissed this one.
    pub fn error_banner<'a>(&self, session: &'a PlaybackSession) -> Option<&'a str> {
        let err = session.last_error.as_deref()?;
        if self.dismissed_error == Some(session.error_seq) {
            None
        } else {
            Some(err)
        }
    }

    pub fn dismiss_error(&mut self, session: &PlaybackSession) {
        if session.last_error.is_some() {
            self.dismissed_error = Some(session.error_seq);
        }
    }

    /// Track after `current_id` in the visible list (or the full list when
    /// it is not visible), wrapping around.
    pub fn track_after(&self, current_id: Option<u64>) -> Option<Track> {
        self.adjacent_track(current_id, 1)
    }

    /// Track before `current_id`, wrapping around.
    pub fn track_before(&self, current_id: Option<u64>) -> Option<Track> {
        self.adjacent_track(current_id, -1)
    }

    fn adjacent_track(&self, current_id: Option<u64>, step: isize) -> Option<Track> {
        let visible = self.visible_tracks();
        let list = match current_id {
            Some(id) if !visible.iter().any(|t| t.id == id) => self.tracks.as_slice(),
            _ if visible.is_empty() => self.tracks.as_slice(),
            _ => visible,
        };
        if list.is_empty() {
            return None;
        }
        let len = list.len() as isize;
        let pos = current_id.and_then(|id| list.iter().position(|t| t.id == id));
        let idx = match pos {
            Some(p) => (p as isize + step).rem_euclid(len),
            None if step > 0 => 0,
            None => len - 1,
        };
        list.get(idx as usize).cloned()
    }
}

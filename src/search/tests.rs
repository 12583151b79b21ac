use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::catalog::{
    Album, CatalogError, DataProvider, MemoryCatalog, NewTrack, Playlist, Track,
};

use super::*;

const WINDOW: Duration = Duration::from_millis(300);

/// Seeded catalog that records every search it serves.
struct Recording {
    inner: MemoryCatalog,
    queries: Mutex<Vec<String>>,
}

impl Recording {
    fn new(inner: MemoryCatalog) -> Arc<Self> {
        Arc::new(Self {
            inner,
            queries: Mutex::new(Vec::new()),
        })
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl DataProvider for Recording {
    fn list_albums(&self) -> Result<Vec<Album>, CatalogError> {
        self.inner.list_albums()
    }
    fn get_album(&self, id: u64) -> Result<Option<Album>, CatalogError> {
        self.inner.get_album(id)
    }
    fn list_tracks(&self) -> Result<Vec<Track>, CatalogError> {
        self.inner.list_tracks()
    }
    fn get_track(&self, id: u64) -> Result<Option<Track>, CatalogError> {
        self.inner.get_track(id)
    }
    fn tracks_by_album(&self, album_id: u64) -> Result<Vec<Track>, CatalogError> {
        self.inner.tracks_by_album(album_id)
    }
    fn search_tracks(&self, query: &str) -> Result<Vec<Track>, CatalogError> {
        self.queries.lock().unwrap().push(query.to_string());
        if query == "boom" {
            return Err(CatalogError::Network("offline".into()));
        }
        self.inner.search_tracks(query)
    }
    fn increment_play_count(&self, track_id: u64) -> Result<(), CatalogError> {
        self.inner.increment_play_count(track_id)
    }
    fn list_playlists(&self) -> Result<Vec<Playlist>, CatalogError> {
        self.inner.list_playlists()
    }
}

fn controller(provider: Arc<Recording>) -> SearchController {
    SearchController::new(provider, WINDOW)
}

/// Poll until a response is applied, failing after two seconds.
fn wait_for_results(search: &mut SearchController, now: Instant) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !search.poll(now) {
        assert!(Instant::now() < deadline, "search never completed");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn debouncer_fires_once_after_quiet_window() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(WINDOW);
    d.schedule("a", t0);
    d.schedule("ab", t0 + Duration::from_millis(100));

    assert_eq!(d.fire(t0 + Duration::from_millis(350)), None);
    assert_eq!(d.deadline(), Some(t0 + Duration::from_millis(400)));
    assert_eq!(d.fire(t0 + Duration::from_millis(400)), Some("ab"));
    assert!(!d.is_pending());
    assert_eq!(d.fire(t0 + Duration::from_secs(5)), None);
}

#[test]
fn debouncer_cancel_drops_pending_value() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(WINDOW);
    d.schedule(1, t0);
    d.cancel();
    assert_eq!(d.fire(t0 + WINDOW), None);
}

#[test]
fn rapid_typing_sends_only_latest_query() {
    let provider = Recording::new(MemoryCatalog::seeded());
    let mut search = controller(provider.clone());
    let t0 = Instant::now();

    search.set_query("a", t0);
    search.poll(t0 + Duration::from_millis(100));
    search.set_query("ab", t0 + Duration::from_millis(100));
    search.poll(t0 + Duration::from_millis(350));
    assert!(!search.is_loading());

    let fired_at = t0 + Duration::from_millis(400);
    wait_for_results(&mut search, fired_at);

    assert_eq!(provider.queries(), vec!["ab".to_string()]);
    assert_eq!(search.latest_seq(), Some(1));
    assert!(!search.is_loading());
}

#[test]
fn whitespace_query_clears_without_calling_provider() {
    let provider = Recording::new(MemoryCatalog::seeded());
    let mut search = controller(provider.clone());
    let t0 = Instant::now();

    search.set_query("honey", t0);
    wait_for_results(&mut search, t0 + WINDOW);
    assert_eq!(search.results().len(), 6);

    search.set_query("   ", t0 + WINDOW);
    assert!(!search.has_query());
    assert!(search.results().is_empty());
    assert!(search.latest_seq().is_none());
    search.poll(t0 + WINDOW * 10);

    assert_eq!(provider.queries(), vec!["honey".to_string()]);
}

#[test]
fn pending_query_is_cancelled_by_clear() {
    let provider = Recording::new(MemoryCatalog::seeded());
    let mut search = controller(provider.clone());
    let t0 = Instant::now();

    search.set_query("love", t0);
    search.clear();
    assert_eq!(search.query(), "");
    assert!(!search.poll(t0 + WINDOW * 2));
    assert!(provider.queries().is_empty());
}

#[test]
fn stale_response_is_ignored() {
    let provider = Recording::new(MemoryCatalog::seeded());
    let mut search = controller(provider);
    let t0 = Instant::now();

    search.set_query("blue", t0);
    wait_for_results(&mut search, t0 + WINDOW);
    let applied = search.results().to_vec();
    assert_eq!(applied.len(), 1);

    let stale = SearchEvent {
        seq: 0,
        outcome: Ok(Vec::new()),
    };
    assert!(!search.apply(stale));
    assert_eq!(search.results(), &applied[..]);
}

#[test]
fn response_after_clear_is_ignored() {
    let provider = Recording::new(MemoryCatalog::seeded());
    let mut search = controller(provider);
    let t0 = Instant::now();

    search.set_query("dope", t0);
    search.poll(t0 + WINDOW);
    let seq = search.latest_seq().unwrap();
    search.clear();

    let late = SearchEvent {
        seq,
        outcome: Ok(vec![]),
    };
    assert!(!search.apply(late));
    assert!(search.results().is_empty());
}

#[test]
fn provider_failure_surfaces_as_empty_results() {
    let provider = Recording::new(MemoryCatalog::seeded());
    let mut search = controller(provider);
    let t0 = Instant::now();

    search.set_query("blue", t0);
    wait_for_results(&mut search, t0 + WINDOW);
    assert_eq!(search.results().len(), 1);

    search.set_query("boom", t0 + WINDOW);
    wait_for_results(&mut search, t0 + WINDOW * 2);
    assert!(search.results().is_empty());
    assert!(search.has_query());
}

#[test]
fn honey_search_finds_seeded_and_inserted_tracks() {
    let catalog = MemoryCatalog::seeded();
    catalog.create_track(NewTrack {
        title: "Millionaire".to_string(),
        artist: "Yo Yo Honey Singh".to_string(),
        album_id: None,
        duration: 200.0,
        audio_url: "https://example.com/m.mp3".to_string(),
        cover_url: String::new(),
    });
    catalog.create_track(NewTrack {
        title: "Unrelated".to_string(),
        artist: "Someone Else".to_string(),
        album_id: None,
        duration: 100.0,
        audio_url: "https://example.com/u.mp3".to_string(),
        cover_url: String::new(),
    });

    let mut search = controller(Recording::new(catalog));
    let t0 = Instant::now();
    search.set_query("  Honey ", t0);
    wait_for_results(&mut search, t0 + WINDOW);

    let titles: Vec<&str> = search.results().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles.len(), 7);
    assert!(titles.contains(&"Millionaire"));
    assert!(!titles.contains(&"Unrelated"));
    assert_eq!(search.query(), "  Honey ");
}

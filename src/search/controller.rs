use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::catalog::{CatalogError, DataProvider, Track};

use super::debounce::Debouncer;

/// A finished search, tagged with the dispatch that produced it.
#[derive(Debug)]
pub struct SearchEvent {
    pub seq: u64,
    pub outcome: Result<Vec<Track>, CatalogError>,
}

/// Debounced, latest-wins track search.
///
/// Typing schedules a query; once input has been quiet for the debounce
/// window, [`SearchController::poll`] sends it to the provider on a worker
/// thread. Only the response to the most recent dispatch is applied.
pub struct SearchController {
    provider: Arc<dyn DataProvider>,
    debouncer: Debouncer<String>,
    query: String,
    results: Vec<Track>,
    loading: bool,
    next_seq: u64,
    current: Option<u64>,
    tx: Sender<SearchEvent>,
    rx: Receiver<SearchEvent>,
}

impl SearchController {
    pub fn new(provider: Arc<dyn DataProvider>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            provider,
            debouncer: Debouncer::new(debounce),
            query: String::new(),
            results: Vec::new(),
            loading: false,
            next_seq: 0,
            current: None,
            tx,
            rx,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[Track] {
        &self.results
    }

    /// True from dispatch until the matching response arrives.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True when the trimmed query is non-empty.
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Sequence of the latest dispatch, if one is outstanding or applied.
    #[cfg(test)]
    pub fn latest_seq(&self) -> Option<u64> {
        self.current
    }

    /// Record new input. Whitespace-only input clears everything at once.
    pub fn set_query(&mut self, text: &str, now: Instant) {
        self.query = text.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.reset();
            return;
        }
        self.debouncer.schedule(trimmed.to_string(), now);
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.reset();
    }

    fn reset(&mut self) {
        self.debouncer.cancel();
        self.results.clear();
        self.loading = false;
        // Outstanding responses no longer match anything.
        self.current = None;
    }

    /// Fire a due query and apply any responses that have arrived.
    ///
    /// Returns true when the visible results changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if let Some(query) = self.debouncer.fire(now) {
            self.dispatch(query);
        }

        let mut changed = false;
        while let Ok(event) = self.rx.try_recv() {
            changed |= self.apply(event);
        }
        changed
    }

    fn dispatch(&mut self, query: String) {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.current = Some(seq);
        self.loading = true;
        log::debug!("search #{seq}: {query:?}");

        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = provider.search_tracks(&query);
            let _ = tx.send(SearchEvent { seq, outcome });
        });
    }

    /// Apply one response; stale ones are dropped. Returns true if applied.
    pub fn apply(&mut self, event: SearchEvent) -> bool {
        if self.current != Some(event.seq) {
            log::debug!("dropping stale search #{}", event.seq);
            return false;
        }
        self.loading = false;
        self.results = match event.outcome {
            Ok(tracks) => tracks,
            Err(e) => {
                log::warn!("search failed: {e}");
                Vec::new()
            }
        };
        true
    }
}

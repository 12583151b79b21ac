//! Playback state, errors and the messages exchanged with loader threads.

use thiserror::Error;

use crate::catalog::{CatalogError, Track};

use super::resource::PlaybackResource;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing loaded.
    #[default]
    Idle,
    /// A resource is being fetched/decoded for `current_track`.
    Loading,
    Playing,
    Paused,
    /// The last load or resume failed; see `PlaybackSession::last_error`.
    Errored,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            PlaybackState::Idle => "Idle",
            PlaybackState::Loading => "Loading",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Errored => "Error",
        }
    }
}

/// Everything the UI and media controls need to know about playback.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    pub current_track: Option<Track>,
    pub state: PlaybackState,
    pub position_secs: f64,
    pub total_secs: f64,
    /// Always within `[0, 1]`.
    pub volume: f32,
    pub muted: bool,
    pub last_error: Option<String>,
    /// Bumped each time `last_error` is set, so a repeated message is a new error.
    pub error_seq: u64,
}

impl PlaybackSession {
    pub fn new(volume: f32) -> Self {
        Self {
            current_track: None,
            state: PlaybackState::Idle,
            position_secs: 0.0,
            total_secs: 0.0,
            volume: clamp_volume(volume).unwrap_or(1.0),
            muted: false,
            last_error: None,
            error_seq: 0,
        }
    }

    /// The gain actually applied to the output.
    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("failed to load audio: {0}")]
    ResourceLoad(String),

    #[error("failed to resume playback: {0}")]
    PlaybackResume(String),

    #[error("visualizer unavailable: {0}")]
    AnalyzerAttach(String),

    #[error("catalog unavailable: {0}")]
    Network(String),
}

impl From<CatalogError> for PlaybackError {
    fn from(e: CatalogError) -> Self {
        PlaybackError::Network(e.to_string())
    }
}

/// Ask a loader to produce a resource for `track`, tagged with the load sequence.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub seq: u64,
    pub track: Track,
}

/// Loader completions, delivered to the event loop.
pub enum EngineEvent {
    ResourceReady {
        seq: u64,
        resource: Box<dyn PlaybackResource>,
    },
    ResourceFailed {
        seq: u64,
        error: PlaybackError,
    },
}

impl EngineEvent {
    pub fn seq(&self) -> u64 {
        match self {
            EngineEvent::ResourceReady { seq, .. } | EngineEvent::ResourceFailed { seq, .. } => {
                *seq
            }
        }
    }
}

impl std::fmt::Debug for EngineEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineEvent::ResourceReady { seq, .. } => {
                f.debug_struct("ResourceReady").field("seq", seq).finish()
            }
            EngineEvent::ResourceFailed { seq, error } => f
                .debug_struct("ResourceFailed")
                .field("seq", seq)
                .field("error", error)
                .finish(),
        }
    }
}

/// Clamp to `[0, 1]`; `None` for NaN.
pub fn clamp_volume(v: f32) -> Option<f32> {
    if v.is_nan() {
        None
    } else {
        Some(v.clamp(0.0, 1.0))
    }
}

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/nebula/config.toml` or `~/.config/nebula/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `NEBULA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub analyzer: AnalyzerSettings,
    pub search: SearchSettings,
    pub catalog: CatalogSettings,
    pub library: LibrarySettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio: AudioSettings::default(),
            analyzer: AnalyzerSettings::default(),
            search: SearchSettings::default(),
            catalog: CatalogSettings::default(),
            library: LibrarySettings::default(),
            controls: ControlsSettings::default(),
            ui: UiSettings::default(),
            log: LogSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Output volume at startup, in `[0, 1]`.
    pub default_volume: f32,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// How often the event loop refreshes position and spectrum (milliseconds).
    pub tick_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            default_volume: 1.0,
            quit_fade_out_ms: 500,
            tick_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// Disable to never attach the spectrum tap.
    pub enabled: bool,
    /// Transform size; must be a power of two. Yields `fft_size / 2` bins.
    pub fft_size: usize,
    /// Averaging constant between consecutive snapshots, in `[0, 1]`.
    pub smoothing: f32,
    /// Magnitude mapped to byte value 0.
    pub min_decibels: f32,
    /// Magnitude mapped to byte value 255.
    pub max_decibels: f32,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            fft_size: 256,
            smoothing: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Input inactivity required before a query is sent (milliseconds).
    pub debounce_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Where tracks and albums come from.
    pub source: CatalogSource,
    /// Base URL of the catalog REST API (used by `remote`).
    pub base_url: String,
    /// Timeout for catalog requests and remote audio downloads (milliseconds).
    pub request_timeout_ms: u64,
    /// Catalog TOML file (used by `file`).
    pub path: Option<PathBuf>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            source: CatalogSource::Demo,
            base_url: "http://localhost:5000".to_string(),
            request_timeout_ms: 10_000,
            path: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogSource {
    /// Built-in seeded catalog.
    #[serde(alias = "seed", alias = "memory", alias = "in-memory")]
    Demo,
    /// Scan a local music directory.
    #[serde(alias = "scan", alias = "local")]
    Library,
    /// Talk to the REST API at `catalog.base_url`.
    #[serde(alias = "rest", alias = "http", alias = "api")]
    Remote,
    /// Load albums/tracks/playlists from a TOML file.
    #[serde(alias = "toml")]
    File,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory to scan when `catalog.source = "library"`.
    pub dir: Option<PathBuf>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            dir: None,
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to seek when pressing `H` / `L`.
    pub seek_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Whether to draw the spectrum panel.
    pub show_visualizer: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ nebula ~ ".to_string(),
            show_visualizer: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `env_logger` filter directives; `RUST_LOG` wins when set.
    pub level: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/nebula/nebula.log`.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

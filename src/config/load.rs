use std::{env, path::PathBuf};

use super::schema::{CatalogSource, Settings};

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `NEBULA__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("NEBULA")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let a = &self.analyzer;
        if !a.fft_size.is_power_of_two() || !(32..=32768).contains(&a.fft_size) {
            return Err(format!(
                "analyzer.fft_size must be a power of two in 32..=32768 (got {})",
                a.fft_size
            ));
        }
        if !(0.0..=1.0).contains(&a.smoothing) {
            return Err("analyzer.smoothing must be within [0, 1]".to_string());
        }
        if a.min_decibels >= a.max_decibels {
            return Err("analyzer.min_decibels must be below analyzer.max_decibels".to_string());
        }
        if !(0.0..=1.0).contains(&self.audio.default_volume) {
            return Err("audio.default_volume must be within [0, 1]".to_string());
        }
        if self.audio.tick_ms == 0 {
            return Err("audio.tick_ms must be >= 1".to_string());
        }
        if !(self.controls.volume_step > 0.0 && self.controls.volume_step <= 1.0) {
            return Err("controls.volume_step must be within (0, 1]".to_string());
        }
        match self.catalog.source {
            CatalogSource::Remote if self.catalog.base_url.trim().is_empty() => {
                return Err("catalog.base_url is required for the remote catalog".to_string());
            }
            CatalogSource::File if self.catalog.path.is_none() => {
                return Err("catalog.path is required for the file catalog".to_string());
            }
            _ => {}
        }
        Ok(())
    }
}

/// Resolve the config path from `NEBULA_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("NEBULA_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/nebula/config.toml`
/// or `~/.config/nebula/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("nebula").join("config.toml"))
}

/// Compute the default log file under `$XDG_STATE_HOME/nebula/nebula.log`
/// or `~/.local/state/nebula/nebula.log`.
pub fn default_log_path() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
    };

    state_home.map(|d| d.join("nebula").join("nebula.log"))
}

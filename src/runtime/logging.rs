use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;

use env_logger::{Builder, Env, Target};

use crate::config::{self, LogSettings};

/// Route `log` output to a file; stdout and stderr are owned by the TUI.
///
/// `RUST_LOG` overrides `log.level`. Returns the file in use.
pub fn init(settings: &LogSettings) -> io::Result<PathBuf> {
    let path = settings
        .file
        .clone()
        .or_else(config::default_log_path)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no log directory"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    Builder::from_env(Env::default().default_filter_or(settings.level.as_str()))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(io::Error::other)?;

    Ok(path)
}

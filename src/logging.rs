//! Log output setup
//!
//! The terminal belongs to the UI, so log records go to a file.

use crate::config::LoggingConfig;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Could not determine log directory")]
    NoLogDir,
    #[error("Could not open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Logger already initialized")]
    AlreadySet(#[from] log::SetLoggerError),
}

/// Install the global logger writing to the configured file.
///
/// `RUST_LOG`, when set, overrides the configured level. Returns the log
/// file path.
pub fn init(config: &LoggingConfig) -> Result<PathBuf, LoggingError> {
    let path = config.file_path().ok_or(LoggingError::NoLogDir)?;
    let file = open_log_file(&path)?;

    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&config.level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()?;

    Ok(path)
}

fn open_log_file(path: &Path) -> Result<fs::File, LoggingError> {
    let open = || -> io::Result<fs::File> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        OpenOptions::new().create(true).append(true).open(path)
    };
    open().map_err(|source| LoggingError::Open {
        path: path.to_path_buf(),
        source,
    })
}

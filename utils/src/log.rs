//! File logging. The terminal is owned by the TUI, so everything goes to
//! `~/.gasboard/gasboard.log`.

use std::{fs::OpenOptions, path::PathBuf, str::FromStr, sync::Mutex};

use tracing_subscriber::{prelude::*, EnvFilter};

use crate::disk_storage::base_dir;

const LOG_FILE: &str = "gasboard.log";

pub fn log_path() -> crate::Result<PathBuf> {
    Ok(base_dir()?.join(LOG_FILE))
}

pub fn parse_level(level: &str) -> crate::Result<tracing::Level> {
    tracing::Level::from_str(level.trim())
        .map_err(|_| crate::Error::InvalidLogLevel(level.to_string()))
}

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set.
pub fn init_logging(level: &str) -> crate::Result<PathBuf> {
    let level = parse_level(level)?;
    let path = log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| crate::Error::CreateDirAllFailed(parent.to_path_buf(), e))?;
    }
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&path)
        .map_err(|e| crate::Error::FileWriteFailed(path.clone(), e))?;

    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::new(level.as_str().to_ascii_lowercase()),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()
        .map_err(|e| crate::Error::LoggingInit(e.to_string()))?;

    Ok(path)
}

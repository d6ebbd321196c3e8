//! Crate error type

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MeasureError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Event queue closed")]
    QueueClosed,
}

pub type Result<T> = std::result::Result<T, MeasureError>;

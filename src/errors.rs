// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PieceError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input format: expected .{expected}, got {path:?}")]
    InvalidInputFormat { path: PathBuf, expected: String },

    #[error("Missing input file: {0:?}")]
    MissingInput(PathBuf),

    #[error("No file set found for {0:?} (no files match its stem)")]
    MissingCompanionFiles(PathBuf),

    #[error(
        "External process failed (rc={status}). See logs: {runner_log:?} (and {fallback_log:?})"
    )]
    ExternalProcessFailure {
        status: i32,
        runner_log: PathBuf,
        fallback_log: PathBuf,
    },

    #[error("External process timed out after {timeout_secs}s. See log: {fallback_log:?}")]
    TimedOut {
        timeout_secs: u64,
        fallback_log: PathBuf,
    },

    #[error("External process was cancelled. See log: {fallback_log:?}")]
    Cancelled { fallback_log: PathBuf },

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PieceError {
    /// Wrap an IO error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PieceError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PieceError>;

// src/classify.rs

//! Success/failure classification of a finished process run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::errors::{PieceError, Result};
use crate::exec::{Invocation, ProcessEnd};

/// The two places a run log may live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    /// Written by the executable itself, if it got that far.
    pub runner: PathBuf,
    /// Always written here from the captured output.
    pub fallback: PathBuf,
}

impl LogPaths {
    /// The runner log if it exists on disk, else the fallback log.
    pub fn authoritative(&self) -> &Path {
        if self.runner.exists() {
            &self.runner
        } else {
            &self.fallback
        }
    }
}

/// Write the captured output to `path`, replacing any previous content.
pub fn write_fallback_log(path: &Path, captured: &str) -> Result<()> {
    fs::write(path, captured).map_err(|e| PieceError::io(path, e))
}

/// Persist the captured output, then decide whether the run succeeded.
///
/// The fallback log is written before any branching so a log exists even when
/// the executable died before producing its own. On success the selected
/// authoritative log path is returned.
pub fn classify(invocation: &Invocation, logs: &LogPaths) -> Result<PathBuf> {
    write_fallback_log(&logs.fallback, &invocation.captured)?;
    let selected = logs.authoritative().to_path_buf();

    match invocation.end {
        ProcessEnd::Exited(0) => {
            info!(log = ?selected, "external process succeeded");
            Ok(selected)
        }
        ProcessEnd::Exited(status) => {
            error!(status, "external process failed");
            error!("see logs: {:?} and {:?}", logs.runner, logs.fallback);
            Err(PieceError::ExternalProcessFailure {
                status,
                runner_log: logs.runner.clone(),
                fallback_log: logs.fallback.clone(),
            })
        }
        ProcessEnd::TimedOut(limit) => Err(PieceError::TimedOut {
            timeout_secs: limit.as_secs(),
            fallback_log: logs.fallback.clone(),
        }),
        ProcessEnd::Cancelled => Err(PieceError::Cancelled {
            fallback_log: logs.fallback.clone(),
        }),
    }
}

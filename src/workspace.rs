// src/workspace.rs

//! Staging workspace: a root directory with an input and an output subdirectory.
//!
//! Every path is derived from the `Workspace` value that is passed around
//! explicitly. A relative root is anchored at the current directory once, on
//! construction, so the paths handed to the executable stay valid after it
//! changes into the root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{PieceError, Result};

/// Default workspace root inside the runtime image.
pub const DEFAULT_ROOT: &str = "/work";
pub const DEFAULT_INPUT_DIR: &str = "in";
pub const DEFAULT_OUTPUT_DIR: &str = "out";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    in_dir: PathBuf,
    out_dir: PathBuf,
}

impl Workspace {
    /// Workspace with the default `in` / `out` layout under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_dirs(root, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR)
    }

    pub fn with_dirs(
        root: impl Into<PathBuf>,
        input_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        let in_dir = root.join(input_dir);
        let out_dir = root.join(output_dir);
        Self {
            root,
            in_dir,
            out_dir,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn in_dir(&self) -> &Path {
        &self.in_dir
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Create the input and output roots if they are missing.
    pub fn provision(&self) -> Result<()> {
        ensure(&self.in_dir)?;
        ensure(&self.out_dir)?;
        Ok(())
    }

    /// Prefix handed to the executable for everything it writes.
    pub fn output_base(&self, basename: &str) -> PathBuf {
        self.out_dir.join(basename)
    }

    /// Log written by the executable itself, if it gets far enough.
    pub fn runner_log(&self, basename: &str) -> PathBuf {
        with_suffix(&self.output_base(basename), "_runner.log")
    }

    /// Log this crate always writes from the captured process output.
    pub fn fallback_log(&self, basename: &str) -> PathBuf {
        self.root.join(format!("{basename}_stdout.log"))
    }

    pub fn archive_path(&self, basename: &str) -> PathBuf {
        self.root.join(format!("{basename}_outputs.zip"))
    }
}

/// Create `path` and any missing ancestors.
///
/// Succeeds without side effects when `path` is already a directory. A
/// non-directory at `path` is reported as an IO failure.
pub fn ensure(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(PieceError::io(
            path,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists and is not a directory",
            ),
        ));
    }

    debug!(path = ?path, "creating directory");
    fs::create_dir_all(path).map_err(|e| PieceError::io(path, e))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_log_and_archive_paths_from_basename() {
        let ws = Workspace::new("/work");
        assert_eq!(ws.output_base("run1"), PathBuf::from("/work/out/run1"));
        assert_eq!(ws.runner_log("run1"), PathBuf::from("/work/out/run1_runner.log"));
        assert_eq!(ws.fallback_log("run1"), PathBuf::from("/work/run1_stdout.log"));
        assert_eq!(ws.archive_path("run1"), PathBuf::from("/work/run1_outputs.zip"));
    }

    #[test]
    fn relative_root_is_anchored_at_current_dir() {
        let ws = Workspace::new("rel_work");
        let cwd = std::env::current_dir().unwrap();

        assert!(ws.root().is_absolute());
        assert_eq!(ws.root(), cwd.join("rel_work"));
        assert_eq!(ws.in_dir(), cwd.join("rel_work/in"));
        assert_eq!(ws.output_base("run1"), cwd.join("rel_work/out/run1"));
    }

    #[test]
    fn ensure_creates_nested_dirs_and_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b/c");

        ensure(&nested).unwrap();
        assert!(nested.is_dir());

        fs::write(nested.join("keep.txt"), b"x").unwrap();
        ensure(&nested).unwrap();
        assert!(nested.join("keep.txt").is_file());
    }

    #[test]
    fn ensure_rejects_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not_a_dir");
        fs::write(&file, b"x").unwrap();

        match ensure(&file) {
            Err(PieceError::Io { path, .. }) => assert_eq!(path, file),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn provision_creates_both_roots() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::with_dirs(tmp.path().join("work"), "staged", "results");

        ws.provision().unwrap();

        assert!(tmp.path().join("work/staged").is_dir());
        assert!(tmp.path().join("work/results").is_dir());
    }
}

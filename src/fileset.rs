// src/fileset.rs

//! Staging of input files into the workspace.
//!
//! Multi-file vector formats (shapefiles) keep geometry, attributes, index and
//! projection in sibling files that share one stem: `ignite.shp`,
//! `ignite.dbf`, `ignite.shx`, `ignite.prj`, ... All of them have to be copied
//! together or the simulator cannot open the primary file. Discovery is a
//! plain `<stem>.*` glob over the primary's directory, so no format-specific
//! parsing is involved.

use std::ffi::OsStr;
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, info};

use crate::errors::{PieceError, Result};
use crate::workspace::ensure;

/// Extension of the primary file of a shapefile set.
pub const SHAPEFILE_EXTENSION: &str = "shp";

/// Barrier argument meaning "no barrier".
pub const NO_BARRIER: &str = "0";

/// A primary file plus every sibling sharing its stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    pub primary: PathBuf,
    /// Sorted; never contains `primary`.
    pub companions: Vec<PathBuf>,
}

impl FileSet {
    /// Discover the file set of `primary`, which must carry `extension`
    /// (compared case-insensitively).
    ///
    /// The extension is checked before the filesystem is touched.
    pub fn discover(primary: &Path, extension: &str) -> Result<FileSet> {
        if !has_extension(primary, extension) {
            return Err(PieceError::InvalidInputFormat {
                path: primary.to_path_buf(),
                expected: extension.to_string(),
            });
        }

        let stem = primary
            .file_stem()
            .and_then(OsStr::to_str)
            .ok_or_else(|| PieceError::MissingCompanionFiles(primary.to_path_buf()))?;
        let dir = match primary.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let matcher = stem_matcher(stem)?;
        let mut matched = Vec::new();

        if dir.is_dir() {
            for entry in fs::read_dir(dir).map_err(|e| PieceError::io(dir, e))? {
                let entry = entry.map_err(|e| PieceError::io(dir, e))?;
                let path = entry.path();
                let Some(name) = path.file_name() else {
                    continue;
                };
                if matcher.is_match(name) && path.is_file() {
                    matched.push(path);
                }
            }
        }

        if matched.is_empty() {
            return Err(PieceError::MissingCompanionFiles(primary.to_path_buf()));
        }
        matched.sort();

        let primary_name = primary.file_name();
        let companions = matched
            .into_iter()
            .filter(|p| p.file_name() != primary_name)
            .collect();

        Ok(FileSet {
            primary: primary.to_path_buf(),
            companions,
        })
    }

    /// Number of files in the set, primary included.
    pub fn file_count(&self) -> usize {
        self.companions.len() + 1
    }

    /// All members of the set: primary first, then companions.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.primary.as_path()).chain(self.companions.iter().map(PathBuf::as_path))
    }

    /// Copy every existing member into `destination_dir` and return the staged
    /// primary path.
    pub fn stage(&self, destination_dir: &Path) -> Result<PathBuf> {
        ensure(destination_dir)?;

        for file in self.files() {
            // The primary itself may be absent when only siblings matched.
            if file.is_file() {
                copy_into(file, destination_dir)?;
            }
        }

        Ok(destination_dir.join(file_name(&self.primary)?))
    }
}

/// Copy one file to `destination_dir/basename(path)`.
pub fn resolve_single_file(path: &Path, destination_dir: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(PieceError::MissingInput(path.to_path_buf()));
    }
    ensure(destination_dir)?;
    let staged = copy_into(path, destination_dir)?;
    info!(src = ?path, dst = ?staged, "staged input file");
    Ok(staged)
}

/// Stage a shapefile set and return the staged `.shp` path.
///
/// Fails with `MissingCompanionFiles` unless at least one sibling besides the
/// primary is found.
pub fn resolve_file_set(primary_path: &Path, destination_dir: &Path) -> Result<PathBuf> {
    resolve_file_set_with_extension(primary_path, destination_dir, SHAPEFILE_EXTENSION)
}

pub fn resolve_file_set_with_extension(
    primary_path: &Path,
    destination_dir: &Path,
    extension: &str,
) -> Result<PathBuf> {
    let set = FileSet::discover(primary_path, extension)?;
    if set.companions.is_empty() {
        // A multi-file format is never usable from its primary alone.
        return Err(PieceError::MissingCompanionFiles(primary_path.to_path_buf()));
    }
    let staged = set.stage(destination_dir)?;
    info!(
        src = ?primary_path,
        dst = ?staged,
        files = set.file_count(),
        "staged file set"
    );
    Ok(staged)
}

/// Turn a barrier reference into the executable's barrier argument.
///
/// `None`, blank or `"0"` map to the `"0"` sentinel without any filesystem
/// access; anything else is staged as a shapefile set.
pub fn resolve_barrier(reference: Option<&str>, destination_dir: &Path) -> Result<String> {
    let reference = reference.map(str::trim).unwrap_or_default();
    if reference.is_empty() || reference == NO_BARRIER {
        debug!("no barrier requested");
        return Ok(NO_BARRIER.to_string());
    }

    let staged = resolve_file_set(Path::new(reference), destination_dir)?;
    Ok(staged.to_string_lossy().into_owned())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

fn stem_matcher(stem: &str) -> Result<GlobMatcher> {
    let pattern = format!("{}.*", globset::escape(stem));
    let glob = GlobBuilder::new(&pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| PieceError::Other(e.into()))?;
    Ok(glob.compile_matcher())
}

fn file_name(path: &Path) -> Result<&OsStr> {
    path.file_name()
        .ok_or_else(|| PieceError::MissingInput(path.to_path_buf()))
}

/// Copy `src` into `dir`, keeping permissions and timestamps where the
/// platform allows.
fn copy_into(src: &Path, dir: &Path) -> Result<PathBuf> {
    let dst = dir.join(file_name(src)?);
    if is_same_file(src, &dst) {
        debug!(path = ?dst, "input already staged");
        return Ok(dst);
    }
    fs::copy(src, &dst).map_err(|e| PieceError::io(&dst, e))?;

    let meta = fs::metadata(src).map_err(|e| PieceError::io(src, e))?;
    let mut times = FileTimes::new();
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    let applied = File::options()
        .write(true)
        .open(&dst)
        .and_then(|f| f.set_times(times));
    if let Err(e) = applied {
        debug!(path = ?dst, error = %e, "could not preserve file times");
    }

    debug!(src = ?src, dst = ?dst, "copied file");
    Ok(dst)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::write(path, path.to_string_lossy().as_bytes()).unwrap();
    }

    #[test]
    fn discover_collects_siblings_sharing_the_stem() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["ignite.shp", "ignite.dbf", "ignite.shx", "ignite.prj", "other.shp", "ignite2.dbf"] {
            touch(&tmp.path().join(name));
        }

        let set = FileSet::discover(&tmp.path().join("ignite.shp"), "shp").unwrap();

        let names: Vec<_> = set
            .companions
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["ignite.dbf", "ignite.prj", "ignite.shx"]);
        assert_eq!(set.file_count(), 4);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("IGNITE.SHP"));
        touch(&tmp.path().join("IGNITE.DBF"));

        let set = FileSet::discover(&tmp.path().join("IGNITE.SHP"), "shp").unwrap();
        assert_eq!(set.file_count(), 2);
    }

    #[test]
    fn glob_metacharacters_in_stem_are_literal() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("fire[1].shp"));
        touch(&tmp.path().join("fire[1].dbf"));
        touch(&tmp.path().join("fire1.dbf"));

        let set = FileSet::discover(&tmp.path().join("fire[1].shp"), "shp").unwrap();
        assert_eq!(set.file_count(), 2);
    }

    #[test]
    fn wrong_extension_is_rejected_even_if_missing() {
        let err = FileSet::discover(Path::new("/definitely/not/here/ignite.txt"), "shp").unwrap_err();
        assert!(matches!(err, PieceError::InvalidInputFormat { .. }));
    }

    #[test]
    fn lone_primary_is_not_a_usable_set() {
        let tmp = tempfile::tempdir().unwrap();
        let shp = tmp.path().join("lonely.shp");
        touch(&shp);

        let err = resolve_file_set(&shp, &tmp.path().join("dest")).unwrap_err();
        assert!(matches!(err, PieceError::MissingCompanionFiles(p) if p == shp));
    }

    #[test]
    fn staging_a_file_onto_itself_keeps_its_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("area.lcp");
        fs::write(&src, b"landscape").unwrap();

        let staged = resolve_single_file(&src, tmp.path()).unwrap();

        assert_eq!(staged, src);
        assert_eq!(fs::read(&src).unwrap(), b"landscape");
    }

    #[test]
    fn blank_barrier_maps_to_sentinel() {
        let dest = Path::new("/definitely/not/here");
        assert_eq!(resolve_barrier(None, dest).unwrap(), "0");
        assert_eq!(resolve_barrier(Some(""), dest).unwrap(), "0");
        assert_eq!(resolve_barrier(Some("  0 "), dest).unwrap(), "0");
        assert!(!dest.exists());
    }
}

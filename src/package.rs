// src/package.rs

//! Packaging of the output directory into a single zip archive.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::{PieceError, Result};

/// Zip every file and subdirectory under `output_root` into `archive_path`.
///
/// Entries are written in sorted order with `/`-separated paths relative to
/// `output_root`; the root itself is not an entry. Symbolic links are
/// followed, so a linked file or directory is archived with its contents.
/// An existing archive is replaced. `archive_path` must lie outside
/// `output_root`.
///
/// The archive is built under a temporary name and renamed into place, so
/// on failure nothing (not even a stale archive) is left at `archive_path`.
pub fn archive(output_root: &Path, archive_path: &Path) -> Result<PathBuf> {
    if !output_root.is_dir() {
        return Err(PieceError::io(
            output_root,
            io::Error::new(io::ErrorKind::NotFound, "output root is not a directory"),
        ));
    }

    let partial = partial_path(archive_path);
    let entries = match write_archive(output_root, &partial) {
        Ok(entries) => entries,
        Err(err) => {
            discard(&partial);
            discard(archive_path);
            return Err(err);
        }
    };

    if let Err(e) = fs::rename(&partial, archive_path) {
        discard(&partial);
        return Err(PieceError::io(archive_path, e));
    }

    info!(archive = ?archive_path, entries, "outputs archived");
    Ok(archive_path.to_path_buf())
}

fn write_archive(output_root: &Path, zip_path: &Path) -> Result<usize> {
    let file = File::create(zip_path).map_err(|e| PieceError::io(zip_path, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let base = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut entries = 0usize;
    let walker = WalkDir::new(output_root)
        .min_depth(1)
        .sort_by_file_name()
        .follow_links(true);

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(output_root).to_path_buf();
            PieceError::io(path, e.into())
        })?;
        let path = entry.path();
        let Some(name) = entry_name(output_root, path) else {
            continue;
        };
        let options = with_permissions(base, path);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            zip.add_directory(format!("{name}/"), options)
                .map_err(|e| PieceError::io(zip_path, io::Error::other(e)))?;
        } else if file_type.is_file() {
            zip.start_file(name.as_str(), options)
                .map_err(|e| PieceError::io(zip_path, io::Error::other(e)))?;
            let mut src = File::open(path).map_err(|e| PieceError::io(path, e))?;
            io::copy(&mut src, &mut zip).map_err(|e| PieceError::io(zip_path, e))?;
        } else {
            warn!(path = ?path, "skipping entry that is neither file nor directory");
            continue;
        }
        debug!(entry = %name, "archived");
        entries += 1;
    }

    let mut writer = zip
        .finish()
        .map_err(|e| PieceError::io(zip_path, io::Error::other(e)))?;
    io::Write::flush(&mut writer).map_err(|e| PieceError::io(zip_path, e))?;
    Ok(entries)
}

fn partial_path(archive_path: &Path) -> PathBuf {
    let mut s = archive_path.as_os_str().to_os_string();
    s.push(".partial");
    PathBuf::from(s)
}

fn discard(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = ?path, "removed incomplete archive"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = ?path, error = %e, "could not remove incomplete archive"),
    }
}

fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(rel.to_string_lossy().replace('\\', "/"))
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, path: &Path) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(meta) => options.unix_permissions(meta.permissions().mode()),
        Err(_) => options,
    }
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _path: &Path) -> SimpleFileOptions {
    options
}

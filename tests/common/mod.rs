#![allow(dead_code, unused_imports)]

pub use farsite_exec_test_utils::builders;
pub use farsite_exec_test_utils::fake_backend;
pub use farsite_exec_test_utils::{init_tracing, with_timeout};

use std::fs::File;
use std::path::Path;

/// Sorted entry names of a zip archive.
pub fn zip_entries(path: &Path) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

/// Sorted `/`-separated relative listing of everything under `root`,
/// directories with a trailing `/`.
pub fn tree_listing(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|e| {
            let e = e.unwrap();
            let rel = e
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            if e.file_type().is_dir() {
                format!("{rel}/")
            } else {
                rel
            }
        })
        .collect();
    names.sort();
    names
}

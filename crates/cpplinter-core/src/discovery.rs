//! Discovery of C/C++ source files under a root path.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["c", "cpp", "h", "hpp"];

pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Every supported file under `root`, sorted. A missing root yields nothing.
pub fn discover_files(root: &Path) -> Vec<PathBuf> {
    discover_files_excluding(root, &[])
}

/// Like [`discover_files`], pruning any entry whose file name is in `exclude`.
pub fn discover_files_excluding(root: &Path, exclude: &[String]) -> Vec<PathBuf> {
    if !root.exists() {
        return Vec::new();
    }

    if root.is_file() {
        return if is_source_file(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e, exclude))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_source_file(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect()
}

fn is_excluded(entry: &walkdir::DirEntry, exclude: &[String]) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| exclude.iter().any(|pattern| pattern == name))
        .unwrap_or(false)
}

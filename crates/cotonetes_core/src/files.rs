//! File-tree helpers for export/import.
//!
//! # Responsibility
//! - Discover input files recursively by extension.
//! - Map between category names and on-disk locations.
//!
//! # Invariants
//! - Discovery order is deterministic (sorted by file name per directory).
//! - Category names always use `/` as separator, whatever the platform.

use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Extension of exported/imported LaTeX files.
pub const LATEX_EXTENSION: &str = "tex";

/// Recursively lists regular files under `root` with the given extension.
pub fn discover_files(root: &Path, extension: &str) -> walkdir::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) == Some(extension) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Derives the category of an input file: its parent directory relative to
/// `root`, or its file stem when it sits directly in `root`.
pub fn category_for_file(root: &Path, file: &Path) -> String {
    let parent = file
        .parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(category_components)
        .unwrap_or_default();

    if parent.is_empty() {
        file.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        parent.join("/")
    }
}

/// Last component of a category, used as file name and section title.
pub fn category_leaf(category: &str) -> &str {
    category.rsplit('/').next().unwrap_or(category)
}

/// 0-based nesting depth of a category (`a` -> 0, `a/b` -> 1).
pub fn category_depth(category: &str) -> usize {
    category.split('/').count().saturating_sub(1)
}

/// Export location of a category: `<root>/<category>/<leaf>.tex`.
pub fn export_target(root: &Path, category: &str) -> PathBuf {
    let mut dir = root.to_path_buf();
    for part in category.split('/').filter(|part| !part.is_empty()) {
        dir.push(part);
    }
    dir.join(format!("{}.{LATEX_EXTENSION}", category_leaf(category)))
}

fn category_components(relative: &Path) -> Vec<String> {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

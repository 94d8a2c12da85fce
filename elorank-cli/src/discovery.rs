/// Image discovery: turn a directory into an item pool.
///
/// Walks the directory recursively, hidden files included and ignore files
/// disregarded, keeping files whose extension is in the allowed list.
/// Identifiers are file names, so two files with the same name in different
/// subdirectories collapse to the first one found in path order.
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::warn;

/// Extensions recognized as images when the config doesn't say otherwise.
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "webp"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name, used as the engine's item identifier.
    pub id: String,
    pub path: PathBuf,
}

pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

/// Find images under `root`, sorted by path, one per file name.
pub fn find_images(root: &Path, extensions: &[String]) -> Vec<ImageFile> {
    let allowed: HashSet<String> = extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .collect();

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in WalkBuilder::new(root).standard_filters(false).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| allowed.contains(&ext.to_ascii_lowercase()));
        if matches {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    let mut seen = HashSet::new();
    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(id) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            warn!(path = %path.display(), "skipping file with non-UTF-8 name");
            continue;
        };
        if !seen.insert(id.clone()) {
            warn!(path = %path.display(), "skipping image with duplicate file name");
            continue;
        }
        images.push(ImageFile { id, path });
    }
    images
}

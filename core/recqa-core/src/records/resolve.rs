use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Expand input paths into an ordered, deduplicated list of existing files.
///
/// Files are kept in the order given; directories are walked recursively
/// with entries sorted by name. Paths that do not exist are logged and
/// dropped. Duplicates keep their first position.
pub fn resolve_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut push = |p: PathBuf| {
        if seen.insert(p.clone()) {
            files.push(p);
        }
    };

    for input in inputs {
        if input.is_dir() {
            for f in files_in_dir(input) {
                push(f);
            }
        } else if input.is_file() {
            debug!(path = %input.display(), "input file exists");
            push(input.clone());
        } else {
            warn!(path = %input.display(), "input does not exist, skipping");
        }
    }
    files
}

fn files_in_dir(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "unreadable directory entry, skipping");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}

/// The file name used to key a file's outputs.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

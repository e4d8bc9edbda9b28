//! Read-only view of a labelled image dataset: one subdirectory per category.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Category directory names under `root`, sorted lexicographically.
pub(crate) fn categories(root: &Path) -> Result<Vec<String>> {
    let mut names = entry_names(root, |path| path.is_dir())
        .with_context(|| format!("failed to list dataset {}", root.display()))?;
    names.sort();
    Ok(names)
}

/// File names directly inside a category directory, sorted.
pub(crate) fn files(dir: &Path) -> Result<Vec<String>> {
    let mut names = entry_names(dir, |path| path.is_file())
        .with_context(|| format!("failed to list {}", dir.display()))?;
    names.sort();
    Ok(names)
}

fn entry_names(dir: &Path, keep: impl Fn(&Path) -> bool) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !keep(&path) {
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        match name.to_str() {
            Some(name) => names.push(name.to_owned()),
            None => tracing::warn!(path = %path.display(), "skipping entry with non UTF-8 name"),
        }
    }
    Ok(names)
}

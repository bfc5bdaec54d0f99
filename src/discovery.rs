//! Locating drift data files under a root directory.

use anyhow::{Context, Result};
use glob::glob;
use std::path::{Path, PathBuf};

/// Find every file named `file_name` at any depth under `root`.
///
/// Results are sorted so that validation messages come out in a stable order
/// across platforms and filesystems.
pub fn find_drift_files(root: &Path, file_name: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        anyhow::bail!("Root directory {} does not exist", root.display());
    }

    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
    let escaped_name = glob::Pattern::escape(file_name);
    let pattern = format!("{}/**/{}", escaped_root, escaped_name);

    let mut paths = glob(&pattern)
        .with_context(|| format!("Invalid search pattern {}", pattern))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to list drift data files under {}", root.display()))?;

    paths.retain(|p| p.is_file());
    paths.sort();

    Ok(paths)
}

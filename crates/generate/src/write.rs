//! Artifact writing shared by both generation strategies.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write a generated artifact under `root` at its basename.
///
/// Creates the destination directory if absent and overwrites any existing
/// file. Paths are unique per (variant, kind), so concurrent writers for
/// different targets never touch the same file.
pub fn write_artifact(root: &Path, basename: &str, contents: &str) -> Result<PathBuf> {
    let dest = root.join(basename);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::io(e, Some(parent.to_path_buf()), "creating artifact directory"))?;
    }
    std::fs::write(&dest, contents)
        .map_err(|e| Error::io(e, Some(dest.clone()), "writing artifact"))?;
    debug!(path = %dest.display(), bytes = contents.len(), "Wrote artifact");
    Ok(dest)
}

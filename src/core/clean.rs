//! Removal of artifacts left by previous builds

use crate::core::error::BuildError;
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Delete every entry under `output_dir` matching `pattern`.
///
/// The pattern is relative to `output_dir`; matching directories are removed
/// recursively. A missing `output_dir` is a no-op. Returns the removed paths.
pub async fn clean(pattern: &str, output_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    if !tokio::fs::try_exists(output_dir)
        .await
        .map_err(|e| BuildError::io(output_dir, e))?
    {
        debug!("Nothing to clean, {} does not exist", output_dir.display());
        return Ok(Vec::new());
    }

    let invalid = |reason: String| BuildError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    };
    if pattern.is_empty() || Path::new(pattern).is_absolute() || pattern.contains("..") {
        return Err(invalid("must be a non-empty relative pattern".to_string()));
    }

    let scoped = format!(
        "{}/{}",
        Pattern::escape(&output_dir.to_string_lossy()),
        pattern
    );
    let root = output_dir.to_path_buf();
    let matches = tokio::task::spawn_blocking(move || collect_matches(&scoped, &root))
        .await
        .map_err(|e| BuildError::io(output_dir, std::io::Error::other(e)))?
        .map_err(|e| invalid(e.to_string()))?;

    let mut removed: Vec<PathBuf> = Vec::new();
    for path in matches {
        // Already gone with a removed parent directory
        if removed.iter().any(|parent| path.starts_with(parent)) {
            continue;
        }

        let metadata = match tokio::fs::symlink_metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(BuildError::io(&path, e)),
        };
        let result = if metadata.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        result.map_err(|e| BuildError::io(&path, e))?;

        debug!("Removed stale output {}", path.display());
        removed.push(path);
    }

    Ok(removed)
}

/// Walk the filesystem for `scoped`, keeping only paths under `root`
fn collect_matches(scoped: &str, root: &Path) -> Result<Vec<PathBuf>, glob::PatternError> {
    let mut matches = Vec::new();
    for entry in glob::glob(scoped)? {
        match entry {
            Ok(path) if path.starts_with(root) => matches.push(path),
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable path during clean: {}", e),
        }
    }
    Ok(matches)
}

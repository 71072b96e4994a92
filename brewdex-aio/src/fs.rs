// brewdex-aio/src/fs.rs
// Filesystem helpers: reading formula sources, atomic writes, tap discovery.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use brewdex_common::error::{BrewdexError, Result};
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// File extensions recognised as formula sources.
pub const FORMULA_EXTENSIONS: &[&str] = &["rb", "json"];

/// Reads the entire contents of a file into a string.
pub fn read_to_string(path: &Path) -> Result<String> {
    debug!("Reading file to string: {}", path.display());
    fs::read_to_string(path).map_err(|e| {
        error!("Failed read file {}: {}", path.display(), e);
        BrewdexError::from(e)
    })
}

/// Asynchronously reads the entire contents of a file into a string.
pub async fn read_to_string_async(path: &Path) -> Result<String> {
    debug!("Async reading file to string: {}", path.display());
    tokio::fs::read_to_string(path).await.map_err(|e| {
        error!("Failed read file {}: {}", path.display(), e);
        BrewdexError::from(e)
    })
}

/// Writes `content` to a temp file beside `original_path`, then renames it
/// into place.
pub fn atomic_write_file(original_path: &Path, content: &[u8]) -> Result<()> {
    let dir = original_path.parent().ok_or_else(|| {
        BrewdexError::Generic(format!(
            "Cannot get parent directory for {}",
            original_path.display()
        ))
    })?;
    fs::create_dir_all(dir)?;

    let mut temp_file = NamedTempFile::new_in(dir)?;
    let temp_path = temp_file.path().to_path_buf();

    debug!(
        "Atomically writing {} bytes to {} via temp file {}",
        content.len(),
        original_path.display(),
        temp_path.display()
    );

    temp_file.write_all(content)?;
    temp_file.flush()?;
    temp_file.as_file().sync_all()?;

    temp_file.persist(original_path).map_err(|e| {
        error!(
            "Failed to persist temporary file {} over {}: {}",
            temp_path.display(),
            original_path.display(),
            e.error
        );
        BrewdexError::Io(Arc::new(e.error))
    })?;

    Ok(())
}

/// Async wrapper around [`atomic_write_file`]; the write runs on the
/// blocking pool.
pub async fn atomic_write_file_async(original_path: &Path, content: &[u8]) -> Result<()> {
    let path = original_path.to_path_buf();
    let content = content.to_vec();
    tokio::task::spawn_blocking(move || atomic_write_file(&path, &content))
        .await
        .map_err(|e| BrewdexError::Generic(format!("Atomic write task failed: {e}")))?
}

fn is_formula_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FORMULA_EXTENSIONS.contains(&ext))
}

/// Recursively collects formula sources (`*.rb`, `*.json`) under `root`.
///
/// Hidden directories (`.git` and friends) are skipped. Unreadable entries
/// are logged and skipped. Results are sorted so that ingestion order is
/// deterministic.
pub fn discover_formula_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(BrewdexError::Config(format!(
            "Tap directory {} does not exist or is not a directory",
            root.display()
        )));
    }
    debug!("Discovering formula sources under {}", root.display());

    let mut files = Vec::new();
    let walker = WalkDir::new(root).follow_links(true).into_iter();
    for entry in walker.filter_entry(|e| {
        e.depth() == 0
            || !e
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
    }) {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_formula_source(entry.path()) => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry under {}: {}", root.display(), e),
        }
    }
    files.sort();
    debug!("Found {} formula source(s)", files.len());
    Ok(files)
}

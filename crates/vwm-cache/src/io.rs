//! File I/O for cache records.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CacheError, Result};

/// Serialize `record` and write it to `path` atomically.
///
/// `temp_tag` must be unique among concurrent writers of the same path.
pub(crate) fn write_record<T: Serialize>(path: &Path, record: &T, temp_tag: u64) -> Result<()> {
    let bytes =
        serde_json::to_vec_pretty(record).map_err(|e| CacheError::Serialization { source: e })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CacheError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = temp_path_for(path, temp_tag);

    let mut file = File::create(&temp_path).map_err(|e| CacheError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(&bytes).map_err(|e| CacheError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;

    file.sync_all().map_err(|e| CacheError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        CacheError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.to_path_buf(),
            source: e,
        }
    })?;

    Ok(())
}

fn temp_path_for(path: &Path, temp_tag: u64) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.{temp_tag}.tmp", std::process::id()));
    path.with_file_name(name)
}

/// Load every `*.json` record in `dir`.
///
/// Unreadable or unparsable files are skipped with a warning. A missing
/// directory yields nothing.
pub(crate) fn load_records<T: DeserializeOwned>(dir: &Path) -> Vec<(String, T)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No cache directory at {}, starting empty", dir.display());
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(
                "Failed to read cache directory {}: {}, starting empty",
                dir.display(),
                e
            );
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
            continue;
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Skipping unreadable cache file {}: {}", path.display(), e);
                continue;
            }
        };

        match serde_json::from_str(&content) {
            Ok(record) => records.push((name, record)),
            Err(e) => {
                tracing::warn!("Skipping corrupt cache file {}: {}", path.display(), e);
            }
        }
    }
    records
}

//! Inventory: enumerate log files under the root and sum their sizes.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

/// One file found under the log root.
#[derive(Debug, Clone, Serialize)]
pub struct LogFileEntry {
    /// Path relative to the root, as accepted by the logs endpoint.
    pub path: String,
    pub full_path: String,
    pub size: u64,
    /// Local time, `%Y-%m-%d %H:%M:%S`.
    pub modified: String,
    #[serde(skip)]
    modified_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogStats {
    pub total_files: usize,
    pub total_size: u64,
    pub total_size_mb: f64,
}

impl LogStats {
    pub fn from_entries(entries: &[LogFileEntry]) -> Self {
        let total_size: u64 = entries.iter().map(|e| e.size).sum();
        let mb = total_size as f64 / (1024.0 * 1024.0);

        Self {
            total_files: entries.len(),
            total_size,
            total_size_mb: (mb * 100.0).round() / 100.0,
        }
    }
}

/// Recursively list regular files under `root` whose extension is
/// `extension`, newest first. Symlinks are not followed and entries that
/// cannot be read are skipped. A missing root lists nothing.
pub fn scan(root: &Path, extension: &str) -> Vec<LogFileEntry> {
    let mut entries: Vec<LogFileEntry> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == extension))
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            let relative = entry.path().strip_prefix(root).ok()?;
            let modified_at = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

            Some(LogFileEntry {
                path: relative.to_string_lossy().into_owned(),
                full_path: entry.path().to_string_lossy().into_owned(),
                size: metadata.len(),
                modified: format_modified(modified_at),
                modified_at,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then_with(|| a.path.cmp(&b.path)));
    entries
}

fn format_modified(at: SystemTime) -> String {
    DateTime::<Local>::from(at).format("%Y-%m-%d %H:%M:%S").to_string()
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fs::Metadata;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

/// One direct child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Absolute path inside the sandbox
    pub path: PathBuf,
    /// Final path component, lossily converted for display
    pub name: String,
    pub is_directory: bool,
    /// The entry itself is a symbolic link; the other fields describe its target
    pub is_symlink: bool,
    /// Size in bytes; always 0 for directories
    pub size: u64,
    pub modified: DateTime<Utc>,
}

impl DirectoryEntry {
    pub(crate) fn from_metadata(
        path: PathBuf,
        name: String,
        meta: &Metadata,
        is_symlink: bool,
    ) -> Self {
        let is_directory = meta.is_dir();
        let modified = meta.modified().unwrap_or(UNIX_EPOCH);

        Self {
            path,
            name,
            is_directory,
            is_symlink,
            size: if is_directory { 0 } else { meta.len() },
            modified: DateTime::<Utc>::from(modified),
        }
    }
}

impl fmt::Display for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_directory {
            write!(f, "[DIR] {}", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

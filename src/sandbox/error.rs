use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("Operation outside sandbox is not allowed: {path} (root: {root})")]
    Containment { path: PathBuf, root: PathBuf },

    #[error("No such file or directory: {0}")]
    NotFound(PathBuf),

    #[error("Already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Cannot rename the sandbox root: {0}")]
    RootRename(PathBuf),

    #[error("Cannot delete the sandbox root: {0}")]
    RootDelete(PathBuf),

    #[error("Invalid name {0:?}: must be a single non-empty path segment")]
    InvalidName(String),

    #[error("Failed to resolve symbolic links in {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Created {path} but failed to write its initial content: {source}")]
    InitialContent {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Delete stopped at {failed} after removing {removed} entries (last removed: {last_deleted}): {source}")]
    PartialFailure {
        last_deleted: PathBuf,
        failed: PathBuf,
        removed: usize,
        #[source]
        source: io::Error,
    },

    #[error("Sandbox root {path} is unavailable: {source}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Category of a [`SandboxError`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Containment,
    NotFound,
    AlreadyExists,
    RootRename,
    RootDelete,
    InvalidName,
    Resolve,
    Read,
    Write,
    PartialFailure,
    RootUnavailable,
}

impl SandboxError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SandboxError::Containment { .. } => ErrorKind::Containment,
            SandboxError::NotFound(_) => ErrorKind::NotFound,
            SandboxError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            SandboxError::RootRename(_) => ErrorKind::RootRename,
            SandboxError::RootDelete(_) => ErrorKind::RootDelete,
            SandboxError::InvalidName(_) => ErrorKind::InvalidName,
            SandboxError::Resolve { .. } => ErrorKind::Resolve,
            SandboxError::Read { .. } => ErrorKind::Read,
            SandboxError::Write { .. } | SandboxError::InitialContent { .. } => ErrorKind::Write,
            SandboxError::PartialFailure { .. } => ErrorKind::PartialFailure,
            SandboxError::RootUnavailable { .. } => ErrorKind::RootUnavailable,
        }
    }

    /// Map an I/O failure during a read-side operation
    pub(crate) fn read(path: PathBuf, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => SandboxError::NotFound(path),
            _ => SandboxError::Read { path, source: err },
        }
    }

    /// Map an I/O failure during a mutating operation
    pub(crate) fn write(path: PathBuf, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => SandboxError::NotFound(path),
            io::ErrorKind::AlreadyExists => SandboxError::AlreadyExists(path),
            _ => SandboxError::Write { path, source: err },
        }
    }
}

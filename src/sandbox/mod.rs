mod delete;
mod entry;
mod error;


pub use delete::{FsRemover, Removal, Remover};
pub use entry::DirectoryEntry;
pub use error::{ErrorKind, SandboxError};

use crate::config::SandboxConfig;
use crate::security::PathGuard;
use std::fs::{self, Metadata, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File operations confined to a single root directory.
///
/// Every path argument goes through [`PathGuard`] before any I/O, and
/// derived paths (a parent joined with a new name) are validated again on
/// their own. The service keeps no state besides the root: each call sees
/// the filesystem as it is at call time.
#[derive(Debug, Clone)]
pub struct SandboxedFileService {
    guard: PathGuard,
}

/// Builder for a [`SandboxedFileService`]
pub struct SandboxBuilder {
    root: PathBuf,
    create_root: bool,
}

impl SandboxBuilder {
    /// Start from the default configuration (`~/FileSystemSandbox`, created if missing)
    pub fn new() -> Self {
        Self::from_config(SandboxConfig::default())
    }

    pub fn from_config(config: SandboxConfig) -> Self {
        Self {
            root: config.root,
            create_root: config.create_root,
        }
    }

    /// Set the root boundary
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Create the root directory (and its parents) if it does not exist
    pub fn create_root(mut self, create: bool) -> Self {
        self.create_root = create;
        self
    }

    /// Fix the root boundary and build the service.
    ///
    /// The root is canonicalized here, once; it never changes afterwards.
    pub fn build(self) -> Result<SandboxedFileService, SandboxError> {
        let unavailable = |source| SandboxError::RootUnavailable {
            path: self.root.clone(),
            source,
        };

        if self.create_root {
            fs::create_dir_all(&self.root).map_err(unavailable)?;
        }

        let root = self.root.canonicalize().map_err(unavailable)?;
        if !root.is_dir() {
            return Err(unavailable(io::Error::other("not a directory")));
        }

        info!(root = %root.display(), "sandbox ready");
        Ok(SandboxedFileService {
            guard: PathGuard::new(root),
        })
    }
}

impl Default for SandboxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxedFileService {
    /// Build a service rooted at `root`, which must already exist
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, SandboxError> {
        SandboxBuilder::new().root(root).create_root(false).build()
    }

    /// The directory a browser should open first: the root itself
    pub fn start_directory(&self) -> &Path {
        self.guard.root()
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    /// List the direct children of `dir`, in the order the filesystem yields them.
    ///
    /// Entries whose metadata cannot be read (deleted mid-scan, permissions)
    /// are logged and skipped.
    pub fn list(&self, dir: impl AsRef<Path>) -> Result<Vec<DirectoryEntry>, SandboxError> {
        let dir = self.guard.validate(dir.as_ref())?;
        let read_dir = fs::read_dir(&dir).map_err(|e| SandboxError::read(dir.clone(), e))?;

        let items = read_dir.filter_map(|item| match item {
            Ok(item) => Some((item.path(), item.metadata())),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                None
            }
        });

        Ok(collect_entries(items))
    }

    /// Read a whole text file
    pub fn read(&self, file: impl AsRef<Path>) -> Result<String, SandboxError> {
        let file = self.guard.validate(file.as_ref())?;

        let meta = fs::metadata(&file).map_err(|e| SandboxError::read(file.clone(), e))?;
        if !meta.is_file() {
            return Err(SandboxError::Read {
                path: file,
                source: io::Error::other("not a regular file"),
            });
        }

        fs::read_to_string(&file).map_err(|e| SandboxError::read(file, e))
    }

    /// Replace the contents of `file`, creating it if needed
    pub fn write(&self, file: impl AsRef<Path>, content: &str) -> Result<(), SandboxError> {
        let file = self.guard.validate(file.as_ref())?;

        fs::write(&file, content).map_err(|source| SandboxError::Write {
            path: file.clone(),
            source,
        })?;

        info!(path = %file.display(), bytes = content.len(), "file written");
        Ok(())
    }

    /// Create an empty directory `name` inside `parent`
    pub fn create_directory(
        &self,
        parent: impl AsRef<Path>,
        name: &str,
    ) -> Result<PathBuf, SandboxError> {
        let target = self.child_path(parent.as_ref(), name)?;

        fs::create_dir(&target).map_err(|e| SandboxError::write(target.clone(), e))?;

        info!(path = %target.display(), "directory created");
        Ok(target)
    }

    /// Create a new file `name` inside `parent`, then write `initial_content` if non-empty.
    ///
    /// If the content cannot be written the empty file stays in place and
    /// [`SandboxError::InitialContent`] is returned.
    pub fn create_file(
        &self,
        parent: impl AsRef<Path>,
        name: &str,
        initial_content: &str,
    ) -> Result<PathBuf, SandboxError> {
        let target = self.child_path(parent.as_ref(), name)?;

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|e| SandboxError::write(target.clone(), e))?;

        info!(path = %target.display(), "file created");

        write_initial_content(&target, file, initial_content)?;
        Ok(target)
    }

    /// Rename `target` to `new_name` within its parent directory.
    ///
    /// The destination is validated on its own, and an occupied destination
    /// is never overwritten.
    pub fn rename(&self, target: impl AsRef<Path>, new_name: &str) -> Result<PathBuf, SandboxError> {
        let source = self.guard.validate_entry(target.as_ref())?;

        if self.guard.is_root(&source) {
            return Err(SandboxError::RootRename(source));
        }
        let parent = source
            .parent()
            .ok_or_else(|| SandboxError::RootRename(source.clone()))?;

        if new_name.is_empty() {
            return Err(SandboxError::InvalidName(new_name.to_string()));
        }

        let destination = self.guard.validate_entry(&parent.join(new_name))?;

        fs::symlink_metadata(&source).map_err(|e| SandboxError::read(source.clone(), e))?;
        if destination == source || fs::symlink_metadata(&destination).is_ok() {
            return Err(SandboxError::AlreadyExists(destination));
        }

        fs::rename(&source, &destination).map_err(|e| SandboxError::write(source.clone(), e))?;

        info!(from = %source.display(), to = %destination.display(), "renamed");
        Ok(destination)
    }

    /// Delete a file, a link, or a whole directory tree.
    ///
    /// Directories are emptied deepest-first before being removed. A failure
    /// part-way through leaves whatever was already removed gone.
    pub fn delete(&self, target: impl AsRef<Path>) -> Result<(), SandboxError> {
        let target = self.guard.validate_entry(target.as_ref())?;

        if self.guard.is_root(&target) {
            return Err(SandboxError::RootDelete(target));
        }

        let meta = fs::symlink_metadata(&target).map_err(|e| SandboxError::read(target.clone(), e))?;
        if meta.is_dir() {
            let steps = delete::plan(&target)?;
            let removed = delete::execute(&steps, &mut FsRemover)?;
            info!(path = %target.display(), removed, "directory deleted");
        } else {
            fs::remove_file(&target).map_err(|e| SandboxError::write(target.clone(), e))?;
            info!(path = %target.display(), "file deleted");
        }

        Ok(())
    }

    /// Validate `parent`, the leaf `name`, and the joined child path
    fn child_path(&self, parent: &Path, name: &str) -> Result<PathBuf, SandboxError> {
        let parent = self.guard.validate(parent)?;
        PathGuard::check_name(name)?;
        self.guard.validate_entry(&parent.join(name))
    }
}

/// Turn `(path, link metadata)` pairs into listing entries.
///
/// A symbolic link is described by what it points to; a dangling link falls
/// back to the link itself. Entries whose own metadata failed are skipped.
fn collect_entries<I>(items: I) -> Vec<DirectoryEntry>
where
    I: IntoIterator<Item = (PathBuf, io::Result<Metadata>)>,
{
    let mut entries = Vec::new();

    for (path, link_meta) in items {
        let link_meta = match link_meta {
            Ok(meta) => meta,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping entry with unreadable metadata");
                continue;
            }
        };

        let is_symlink = link_meta.file_type().is_symlink();
        let meta = if is_symlink {
            fs::metadata(&path).unwrap_or(link_meta)
        } else {
            link_meta
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        entries.push(DirectoryEntry::from_metadata(path, name, &meta, is_symlink));
    }

    entries
}

/// Write the first content of a freshly created file.
///
/// On failure the file is left where it is.
fn write_initial_content<W: Write>(
    path: &Path,
    mut file: W,
    content: &str,
) -> Result<(), SandboxError> {
    if content.is_empty() {
        return Ok(());
    }

    file.write_all(content.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|source| SandboxError::InitialContent {
            path: path.to_path_buf(),
            source,
        })
}

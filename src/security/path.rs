use crate::sandbox::SandboxError;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Maximum number of symbolic links followed while resolving one path
const MAX_SYMLINK_HOPS: usize = 40;

/// Decides whether a candidate path may be handed to the filesystem.
///
/// Every path is treated as untrusted input:
/// - Relative paths are resolved against the root, not the working directory
/// - `.` and `..` segments are collapsed before anything else happens
/// - Symbolic links are resolved up front, so a link inside the root that
///   points elsewhere is judged by where it points
/// - Containment is a component-wise prefix test (`/root-extra` is not
///   inside `/root`)
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// Create a guard for an already canonical root directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The boundary this guard enforces
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate a candidate, following symbolic links in every component.
    ///
    /// Returns the resolved absolute path, safe to pass to `std::fs`.
    pub fn validate(&self, candidate: &Path) -> Result<PathBuf, SandboxError> {
        let lexical = self.absolutize(candidate);
        let resolved = resolve(&lexical, MAX_SYMLINK_HOPS).map_err(|source| SandboxError::Resolve {
            path: lexical.clone(),
            source,
        })?;
        self.check_contained(candidate, resolved)
    }

    /// Validate a candidate without following a link in its final component.
    ///
    /// Used when the operation acts on the directory entry itself (rename,
    /// delete): a link pointing out of the root can still be removed, and
    /// its target is never touched.
    pub fn validate_entry(&self, candidate: &Path) -> Result<PathBuf, SandboxError> {
        let lexical = self.absolutize(candidate);
        let (parent, name) = match (lexical.parent(), lexical.file_name()) {
            (Some(parent), Some(name)) => (parent, name.to_os_string()),
            _ => return self.validate(candidate),
        };

        let resolved_parent = resolve(parent, MAX_SYMLINK_HOPS).map_err(|source| SandboxError::Resolve {
            path: lexical.clone(),
            source,
        })?;
        self.check_contained(candidate, resolved_parent.join(name))
    }

    /// Ensure a caller-supplied leaf name is exactly one path segment.
    ///
    /// `\` is refused on every platform, even where it is a legal filename
    /// byte, so a name created here stays a single segment on Windows too.
    pub fn check_name(name: &str) -> Result<(), SandboxError> {
        let invalid = name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('\0')
            || name.chars().any(std::path::is_separator)
            || name.contains('\\');

        if invalid {
            return Err(SandboxError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    /// True when `path` is the root boundary itself
    pub fn is_root(&self, path: &Path) -> bool {
        path == self.root
    }

    fn absolutize(&self, candidate: &Path) -> PathBuf {
        if candidate.is_absolute() {
            normalize(candidate)
        } else {
            normalize(&self.root.join(candidate))
        }
    }

    fn check_contained(&self, candidate: &Path, resolved: PathBuf) -> Result<PathBuf, SandboxError> {
        if resolved.starts_with(&self.root) {
            debug!(candidate = %candidate.display(), resolved = %resolved.display(), "path accepted");
            Ok(resolved)
        } else {
            warn!(
                candidate = %candidate.display(),
                resolved = %resolved.display(),
                root = %self.root.display(),
                "path rejected: outside sandbox"
            );
            Err(SandboxError::Containment {
                path: resolved,
                root: self.root.clone(),
            })
        }
    }
}

/// Collapse `.` and `..` segments without touching the filesystem.
///
/// `..` above the filesystem root stays at the root, matching how the
/// kernel treats `/..`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => continue,
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }

    out
}

/// Resolve symbolic links along an absolute, normalized path.
///
/// The longest existing prefix is canonicalized; components that do not
/// exist yet are appended as-is. A dangling link is followed to where it
/// would point, so creating through it cannot land outside the root.
fn resolve(path: &Path, hops: usize) -> io::Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut tail: Vec<OsString> = Vec::new();

    loop {
        match existing.canonicalize() {
            Ok(real) => {
                let mut out = real;
                for part in tail.iter().rev() {
                    out.push(part);
                }
                return Ok(out);
            }
            Err(_) => {
                if let Ok(meta) = fs::symlink_metadata(&existing) {
                    if meta.file_type().is_symlink() {
                        if hops == 0 {
                            return Err(io::Error::other("too many levels of symbolic links"));
                        }

                        // `..` in a relative target is relative to the real parent,
                        // not to whatever alias led here
                        let target = fs::read_link(&existing)?;
                        let parent = existing.parent().unwrap_or_else(|| Path::new("/"));
                        let base = resolve(parent, hops - 1)?;
                        let mut next = normalize(&base.join(target));
                        for part in tail.iter().rev() {
                            next.push(part);
                        }
                        return resolve(&normalize(&next), hops - 1);
                    }
                }

                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        tail.push(name.to_os_string());
                        existing = parent.to_path_buf();
                    }
                    _ => return Ok(path.to_path_buf()),
                }
            }
        }
    }
}

use super::SandboxError;
use std::cmp::Reverse;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One step of a recursive delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub path: PathBuf,
    /// Levels below the delete target (the target itself is 0)
    pub depth: usize,
    pub is_dir: bool,
}

/// The primitive removals a recursive delete is built from
pub trait Remover {
    fn remove_file(&mut self, path: &Path) -> io::Result<()>;
    fn remove_dir(&mut self, path: &Path) -> io::Result<()>;
}

/// Removes entries from the real filesystem
pub struct FsRemover;

impl Remover for FsRemover {
    fn remove_file(&mut self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn remove_dir(&mut self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}

/// Enumerate everything under `target` and order it deepest-first.
///
/// Links are never followed: a symlink is a leaf to be unlinked. The sort
/// is stable, so siblings keep the order the walk produced them in.
pub fn plan(target: &Path) -> Result<Vec<Removal>, SandboxError> {
    let mut steps = Vec::new();

    for entry in WalkDir::new(target).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(target).to_path_buf();
            SandboxError::read(path, io::Error::from(e))
        })?;

        steps.push(Removal {
            path: entry.path().to_path_buf(),
            depth: entry.depth(),
            is_dir: entry.file_type().is_dir(),
        });
    }

    steps.sort_by_key(|step| Reverse(step.depth));
    Ok(steps)
}

/// Run a plan, stopping at the first failure.
///
/// Nothing is rolled back. If the very first step fails the underlying
/// error is returned as-is; once anything has been removed the failure is
/// reported as [`SandboxError::PartialFailure`].
pub fn execute<R: Remover>(steps: &[Removal], remover: &mut R) -> Result<usize, SandboxError> {
    let mut last_deleted: Option<&Path> = None;

    for (removed, step) in steps.iter().enumerate() {
        let result = if step.is_dir {
            remover.remove_dir(&step.path)
        } else {
            remover.remove_file(&step.path)
        };

        if let Err(err) = result {
            return Err(match last_deleted {
                None => SandboxError::write(step.path.clone(), err),
                Some(last) => SandboxError::PartialFailure {
                    last_deleted: last.to_path_buf(),
                    failed: step.path.clone(),
                    removed,
                    source: err,
                },
            });
        }

        last_deleted = Some(&step.path);
    }

    Ok(steps.len())
}

#[cfg(test)]
mod tests {
    use crate::security::{PathGuard, normalize};
    use crate::{ErrorKind, SandboxError};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn guard() -> (TempDir, PathGuard) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap().join("sandbox");
        fs::create_dir(&root).unwrap();
        (dir, PathGuard::new(root))
    }

    #[test]
    fn test_normalize_collapses_dots() {
        assert_eq!(
            normalize(Path::new("/sandbox/./a/../b")),
            PathBuf::from("/sandbox/b")
        );
    }

    #[test]
    fn test_normalize_parent_of_root_stays_at_root() {
        assert_eq!(normalize(Path::new("/../../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn test_normalize_escape_from_sandbox() {
        assert_eq!(
            normalize(Path::new("/sandbox/../etc/passwd")),
            PathBuf::from("/etc/passwd")
        );
    }

    #[test]
    fn test_root_itself_is_valid() {
        let (_dir, guard) = guard();
        let result = guard.validate(guard.root());
        assert_eq!(result.unwrap(), guard.root());
    }

    #[test]
    fn test_descendant_is_valid_even_if_missing() {
        let (_dir, guard) = guard();
        let candidate = guard.root().join("docs/new.txt");
        assert_eq!(guard.validate(&candidate).unwrap(), candidate);
    }

    #[test]
    fn test_relative_path_resolves_against_root() {
        let (_dir, guard) = guard();
        let result = guard.validate(Path::new("notes/./todo.txt"));
        assert_eq!(result.unwrap(), guard.root().join("notes/todo.txt"));
    }

    #[test]
    fn test_reject_parent_traversal() {
        let (_dir, guard) = guard();
        let candidate = guard.root().join("../outside.txt");
        let err = guard.validate(&candidate).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Containment);
        assert!(err.to_string().contains("outside sandbox"));
    }

    #[test]
    fn test_reject_relative_traversal() {
        let (_dir, guard) = guard();
        let err = guard.validate(Path::new("a/../../etc/passwd")).unwrap_err();
        assert!(matches!(err, SandboxError::Containment { .. }));
    }

    #[test]
    fn test_reject_absolute_path_elsewhere() {
        let (_dir, guard) = guard();
        let err = guard.validate(Path::new("/etc/passwd")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Containment);
    }

    #[test]
    fn test_sibling_with_shared_prefix_is_outside() {
        let (dir, guard) = guard();
        let sibling = dir.path().canonicalize().unwrap().join("sandbox-extra");
        fs::create_dir(&sibling).unwrap();

        let err = guard.validate(&sibling.join("file.txt")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Containment);
    }

    #[test]
    fn test_traversal_back_inside_is_valid() {
        let (_dir, guard) = guard();
        let candidate = guard.root().join("a/../b");
        assert_eq!(guard.validate(&candidate).unwrap(), guard.root().join("b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_reject_symlink_escape() {
        let (dir, guard) = guard();
        let outside = dir.path().canonicalize().unwrap().join("outside");
        fs::create_dir(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, guard.root().join("escape")).unwrap();

        let err = guard.validate(&guard.root().join("escape/secret.txt")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Containment);
    }

    #[cfg(unix)]
    #[test]
    fn test_reject_dangling_symlink_escape() {
        let (dir, guard) = guard();
        let target = dir.path().canonicalize().unwrap().join("not-yet-created.txt");
        std::os::unix::fs::symlink(&target, guard.root().join("dangling")).unwrap();

        let err = guard.validate(&guard.root().join("dangling")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Containment);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_root_is_valid() {
        let (_dir, guard) = guard();
        fs::create_dir(guard.root().join("real")).unwrap();
        std::os::unix::fs::symlink(guard.root().join("real"), guard.root().join("alias")).unwrap();

        let result = guard.validate(&guard.root().join("alias/file.txt"));
        assert_eq!(result.unwrap(), guard.root().join("real/file.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_entry_keeps_final_link() {
        let (dir, guard) = guard();
        let outside = dir.path().canonicalize().unwrap().join("outside");
        fs::create_dir(&outside).unwrap();
        let link = guard.root().join("escape");
        std::os::unix::fs::symlink(&outside, &link).unwrap();

        assert_eq!(guard.validate_entry(&link).unwrap(), link);
        assert!(guard.validate(&link).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_loop_is_an_error() {
        let (_dir, guard) = guard();
        let a = guard.root().join("a");
        let b = guard.root().join("b");
        std::os::unix::fs::symlink(&b, &a).unwrap();
        std::os::unix::fs::symlink(&a, &b).unwrap();

        assert_eq!(guard.validate(&a).unwrap_err().kind(), ErrorKind::Resolve);
        assert_eq!(
            guard.validate_entry(&a.join("child")).unwrap_err().kind(),
            ErrorKind::Resolve
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_relative_link_through_aliased_directory() {
        let (_dir, guard) = guard();
        let root = guard.root().to_path_buf();
        fs::create_dir_all(root.join("deep/p/q")).unwrap();
        fs::create_dir(root.join("a")).unwrap();
        fs::write(root.join("a/y"), "precious").unwrap();
        std::os::unix::fs::symlink(root.join("deep/p/q"), root.join("a/l1")).unwrap();
        std::os::unix::fs::symlink("../y", root.join("deep/p/q/dangling")).unwrap();

        let resolved = guard.validate(&root.join("a/l1/dangling")).unwrap();
        assert_eq!(resolved, root.join("deep/p/y"));
    }

    #[test]
    fn test_check_name_accepts_single_segment() {
        assert!(PathGuard::check_name("notes.txt").is_ok());
        assert!(PathGuard::check_name(".hidden").is_ok());
        assert!(PathGuard::check_name("My Documents").is_ok());
        assert!(PathGuard::check_name("文档").is_ok());
    }

    #[test]
    fn test_check_name_rejects_bad_names() {
        for name in ["", ".", "..", "a/b", "../evil", "a\\b", "nul\0byte"] {
            let err = PathGuard::check_name(name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidName, "name {:?}", name);
        }
    }
}

//! Filesystem operations abstraction layer
//!
//! This module provides an abstraction over the filesystem operations the
//! installer performs, so that asset placement and directory bootstrap can be
//! exercised against an in-memory tree in tests and against `std::fs` in
//! production.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

/// Trait for filesystem operations
///
/// This trait abstracts filesystem operations, making the code testable
/// by allowing mock implementations for testing and real implementations for production.
pub trait FileSystem {
    /// Create a directory and all its parent directories
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// Remove a directory and all its contents
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// Copy a file from source to destination, overwriting the destination
    fn copy(&self, from: &Path, to: &Path) -> Result<u64>;

    /// List the paths of the entries directly inside a directory, sorted
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if a path is a symlink (doesn't follow symlinks)
    fn is_symlink(&self, path: &Path) -> bool;
}

/// Production implementation using std::fs
#[derive(Debug, Clone, Copy)]
pub struct RealFileSystem;

impl RealFileSystem {
    /// Create a new RealFileSystem instance
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)?;
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path)?;
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::remove_dir_all(path)?;
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        let bytes = std::fs::copy(from, to)?;
        Ok(bytes)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        path.symlink_metadata()
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }
}

pub mod mock {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, BTreeSet, HashMap};

    /// In-memory filesystem for testing
    ///
    /// Directories are tracked explicitly; copying a file requires its
    /// parent directory to exist, as on a real filesystem.
    #[derive(Debug, Default)]
    pub struct MockFileSystem {
        files: RefCell<BTreeMap<PathBuf, String>>,
        directories: RefCell<BTreeSet<PathBuf>>,
        symlinks: RefCell<BTreeSet<PathBuf>>,
        should_fail: RefCell<HashMap<PathBuf, &'static str>>,
    }

    impl MockFileSystem {
        /// Create a new MockFileSystem instance
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a file (and its parent directories) to the mock filesystem
        pub fn with_file(self, path: &str, content: &str) -> Self {
            let path = PathBuf::from(path);
            if let Some(parent) = path.parent() {
                self.insert_dirs(parent);
            }
            self.files.borrow_mut().insert(path, content.to_string());
            self
        }

        /// Add a directory (and its parents) to the mock filesystem
        pub fn with_directory(self, path: &str) -> Self {
            self.insert_dirs(Path::new(path));
            self
        }

        /// Add a symlink entry; it is listed by `read_dir` but is neither file nor directory
        pub fn with_symlink(self, path: &str) -> Self {
            let path = PathBuf::from(path);
            if let Some(parent) = path.parent() {
                self.insert_dirs(parent);
            }
            self.symlinks.borrow_mut().insert(path);
            self
        }

        /// Make every operation touching a specific path fail
        pub fn with_failure(self, path: &str, error: &'static str) -> Self {
            self.should_fail
                .borrow_mut()
                .insert(PathBuf::from(path), error);
            self
        }

        /// All file paths currently stored, sorted
        pub fn file_paths(&self) -> Vec<PathBuf> {
            self.files.borrow().keys().cloned().collect()
        }

        /// Content of a stored file
        pub fn content(&self, path: &str) -> Option<String> {
            self.files.borrow().get(Path::new(path)).cloned()
        }

        fn insert_dirs(&self, path: &Path) {
            let mut dirs = self.directories.borrow_mut();
            for ancestor in path.ancestors() {
                if ancestor.as_os_str().is_empty() {
                    continue;
                }
                dirs.insert(ancestor.to_path_buf());
            }
        }

        fn check_failure(&self, path: &Path) -> Result<()> {
            if let Some(error) = self.should_fail.borrow().get(path) {
                return Err(anyhow!("Mock filesystem error: {error}"));
            }
            Ok(())
        }

        fn require_parent_dir(&self, path: &Path) -> Result<()> {
            match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() && !self.is_dir(parent) => Err(
                    anyhow!("No such file or directory: {}", parent.display()),
                ),
                _ => Ok(()),
            }
        }
    }

    impl FileSystem for MockFileSystem {
        fn create_dir_all(&self, path: &Path) -> Result<()> {
            self.check_failure(path)?;
            if let Some(file) = path.ancestors().find(|a| self.is_file(a)) {
                return Err(anyhow!("Not a directory: {}", file.display()));
            }
            self.insert_dirs(path);
            Ok(())
        }

        fn remove_file(&self, path: &Path) -> Result<()> {
            self.check_failure(path)?;
            if self.files.borrow_mut().remove(path).is_some()
                || self.symlinks.borrow_mut().remove(path)
            {
                Ok(())
            } else {
                Err(anyhow!("File not found: {}", path.display()))
            }
        }

        fn remove_dir_all(&self, path: &Path) -> Result<()> {
            self.check_failure(path)?;
            if !self.is_dir(path) {
                return Err(anyhow!("Directory not found: {}", path.display()));
            }
            self.directories.borrow_mut().retain(|p| !p.starts_with(path));
            self.files.borrow_mut().retain(|p, _| !p.starts_with(path));
            self.symlinks.borrow_mut().retain(|p| !p.starts_with(path));
            Ok(())
        }

        fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
            self.check_failure(from)?;
            self.check_failure(to)?;
            let content = self
                .files
                .borrow()
                .get(from)
                .cloned()
                .ok_or_else(|| anyhow!("Source file not found: {}", from.display()))?;
            self.require_parent_dir(to)?;
            if self.is_dir(to) {
                return Err(anyhow!("Is a directory: {}", to.display()));
            }
            let bytes = content.len() as u64;
            self.files.borrow_mut().insert(to.to_path_buf(), content);
            Ok(bytes)
        }

        fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
            self.check_failure(path)?;
            if !self.is_dir(path) {
                return Err(anyhow!("Directory not found: {}", path.display()));
            }
            let is_child = |p: &Path| p.parent() == Some(path);
            let mut entries: Vec<PathBuf> = self
                .directories
                .borrow()
                .iter()
                .filter(|p| is_child(p))
                .cloned()
                .collect();
            entries.extend(self.files.borrow().keys().filter(|p| is_child(p)).cloned());
            entries.extend(self.symlinks.borrow().iter().filter(|p| is_child(p)).cloned());
            entries.sort();
            Ok(entries)
        }

        fn exists(&self, path: &Path) -> bool {
            self.is_file(path) || self.is_dir(path) || self.is_symlink(path)
        }

        fn is_file(&self, path: &Path) -> bool {
            self.files.borrow().contains_key(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.directories.borrow().contains(path)
        }

        fn is_symlink(&self, path: &Path) -> bool {
            self.symlinks.borrow().contains(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockFileSystem;
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_mock_filesystem_basic_operations() -> Result<()> {
        let fs = MockFileSystem::new()
            .with_file("/test/file.txt", "content")
            .with_directory("/test/dir");

        assert!(fs.exists(&PathBuf::from("/test/file.txt")));
        assert!(fs.is_file(&PathBuf::from("/test/file.txt")));
        assert!(!fs.is_dir(&PathBuf::from("/test/file.txt")));
        assert!(fs.is_dir(&PathBuf::from("/test")));

        assert_eq!(fs.content("/test/file.txt").as_deref(), Some("content"));

        let entries = fs.read_dir(&PathBuf::from("/test"))?;
        assert_eq!(
            entries,
            vec![PathBuf::from("/test/dir"), PathBuf::from("/test/file.txt")]
        );

        Ok(())
    }

    #[test]
    fn test_mock_filesystem_copy_requires_parent() -> Result<()> {
        let fs = MockFileSystem::new().with_file("/src/a.css", "body {}");

        assert!(fs.copy(Path::new("/src/a.css"), Path::new("/dst/a.css")).is_err());

        fs.create_dir_all(Path::new("/dst"))?;
        let bytes = fs.copy(Path::new("/src/a.css"), Path::new("/dst/a.css"))?;
        assert_eq!(bytes, 7);
        assert_eq!(fs.content("/dst/a.css").as_deref(), Some("body {}"));

        Ok(())
    }

    #[test]
    fn test_mock_filesystem_create_dir_over_file_fails() {
        let fs = MockFileSystem::new().with_file("/project/source", "not a dir");
        assert!(fs.create_dir_all(Path::new("/project/source")).is_err());
        assert!(fs.create_dir_all(Path::new("/project/source/nested")).is_err());
    }

    #[test]
    fn test_mock_filesystem_failures() {
        let fs = MockFileSystem::new().with_failure("/fail/path", "Simulated error");

        assert!(fs.create_dir_all(&PathBuf::from("/fail/path")).is_err());
        assert!(fs.remove_file(&PathBuf::from("/fail/path")).is_err());
        assert!(fs.read_dir(&PathBuf::from("/fail/path")).is_err());
    }

    #[test]
    fn test_mock_filesystem_remove_dir_all_is_component_wise() -> Result<()> {
        let fs = MockFileSystem::new()
            .with_file("/remove/dir/file.txt", "content")
            .with_file("/remove/dir2/keep.txt", "keep");

        fs.remove_dir_all(&PathBuf::from("/remove/dir"))?;
        assert!(!fs.exists(&PathBuf::from("/remove/dir")));
        assert!(!fs.exists(&PathBuf::from("/remove/dir/file.txt")));
        assert!(fs.exists(&PathBuf::from("/remove/dir2/keep.txt")));

        Ok(())
    }

    #[test]
    fn test_real_filesystem_read_dir_sorted() -> Result<()> {
        let temp = tempfile::TempDir::new()?;
        std::fs::write(temp.path().join("b.txt"), "b")?;
        std::fs::write(temp.path().join("a.txt"), "a")?;

        let fs = RealFileSystem::new();
        let entries = fs.read_dir(temp.path())?;
        assert_eq!(
            entries,
            vec![temp.path().join("a.txt"), temp.path().join("b.txt")]
        );
        Ok(())
    }
}

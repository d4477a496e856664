//! Project-relative file operations with overwrite and dry-run policy
//!
//! All generator writes go through [`ProjectFs`] so the existence check,
//! force-overwrite flag and dry-run simulation live in one place. Paths are
//! always relative to the project root.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// File writer capability shared by every asset generator.
#[derive(Debug, Clone)]
pub struct ProjectFs {
    project_path: PathBuf,
    force_overwrite: bool,
    dry_run: bool,
}

impl ProjectFs {
    pub fn new(project_path: PathBuf, force_overwrite: bool, dry_run: bool) -> Self {
        debug!(
            project_path = %project_path.display(),
            force_overwrite, dry_run, "ProjectFs initialized"
        );
        Self {
            project_path,
            force_overwrite,
            dry_run,
        }
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    pub fn force_overwrite(&self) -> bool {
        self.force_overwrite
    }

    /// Resolves a project-relative path to an absolute one.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.project_path.join(relative)
    }

    pub fn file_exists(&self, relative: &str) -> bool {
        let path = self.resolve(relative);
        path.is_file()
    }

    /// Creates a directory (and parents) under the project root.
    pub fn ensure_directory(&self, relative: &str) -> bool {
        let dir = self.resolve(relative);

        if self.dry_run {
            info!(dir = %dir.display(), "DRY RUN: would create directory");
            return true;
        }

        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                debug!(dir = %dir.display(), "Ensured directory exists");
                true
            }
            Err(e) => {
                error!(dir = %dir.display(), error = %e, "Failed to create directory");
                false
            }
        }
    }

    /// Reads a file, returning `None` if it is absent or unreadable.
    pub fn read_file(&self, relative: &str) -> Option<String> {
        let path = self.resolve(relative);

        if !path.exists() {
            debug!(path = %path.display(), "File does not exist");
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "Read file");
                Some(content)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read file");
                None
            }
        }
    }

    /// Writes content to a project-relative path.
    ///
    /// Returns `false` without touching disk when the target exists and
    /// force-overwrite is off, when the parent directory cannot be created, or
    /// when the write itself fails. Dry-run reports the intent and returns
    /// `true`.
    pub fn write_file(&self, relative: &str, content: &str) -> bool {
        let path = self.resolve(relative);

        if path.exists() && !self.force_overwrite {
            info!(path = %path.display(), "File exists and force_overwrite is off, skipping");
            return false;
        }

        if let Some(parent) = path.parent() {
            if !self.dry_run {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    error!(dir = %parent.display(), error = %e, "Failed to create parent directory");
                    return false;
                }
            }
        }

        if self.dry_run {
            info!(path = %path.display(), bytes = content.len(), "DRY RUN: would write file");
            return true;
        }

        match std::fs::write(&path, content) {
            Ok(()) => {
                info!(path = %path.display(), "Wrote file");
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to write file");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture(force: bool, dry_run: bool) -> (TempDir, ProjectFs) {
        let dir = TempDir::new().unwrap();
        let fs = ProjectFs::new(dir.path().to_path_buf(), force, dry_run);
        (dir, fs)
    }

    #[test]
    fn test_write_and_read_roundtrip() {
        let (_dir, fs) = fixture(false, false);
        assert!(fs.write_file("a/b.txt", "hello"));
        assert_eq!(fs.read_file("a/b.txt").as_deref(), Some("hello"));
        assert!(fs.file_exists("a/b.txt"));
    }

    #[test]
    fn test_write_refuses_overwrite_by_default() {
        let (_dir, fs) = fixture(false, false);
        assert!(fs.write_file("f.txt", "one"));
        assert!(!fs.write_file("f.txt", "two"));
        assert_eq!(fs.read_file("f.txt").as_deref(), Some("one"));
    }

    #[test]
    fn test_force_overwrite() {
        let (_dir, fs) = fixture(true, false);
        assert!(fs.write_file("f.txt", "one"));
        assert!(fs.write_file("f.txt", "two"));
        assert_eq!(fs.read_file("f.txt").as_deref(), Some("two"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (_dir, fs) = fixture(false, true);
        assert!(fs.write_file("f.txt", "content"));
        assert!(!fs.file_exists("f.txt"));
        assert!(fs.ensure_directory("sub"));
        assert!(!fs.resolve("sub").exists());
    }

    #[test]
    fn test_read_missing_file() {
        let (_dir, fs) = fixture(false, false);
        assert!(fs.read_file("missing.txt").is_none());
    }

    #[test]
    fn test_ensure_directory() {
        let (_dir, fs) = fixture(false, false);
        assert!(fs.ensure_directory("x/y/z"));
        assert!(fs.resolve("x/y/z").is_dir());
    }
}

//! Local filesystem adapter using std::fs and walkdir.

use std::fs;
use std::io;
use std::path::Path;

use copier_fixture_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::IgnoreSet,
    error::{FixtureError, FixtureResult},
};
use tracing::{debug, instrument};
use walkdir::WalkDir;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> FixtureResult<()> {
        fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    #[instrument(skip_all, fields(src = %src.display(), dst = %dst.display()))]
    fn copy_tree(&self, src: &Path, dst: &Path, exclude: &IgnoreSet) -> FixtureResult<()> {
        self.create_dir_all(dst)?;

        let walker = WalkDir::new(src)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                entry
                    .path()
                    .strip_prefix(src)
                    .map(|relative| !exclude.matches(relative))
                    .unwrap_or(true)
            });

        let mut copied = 0usize;
        for entry in walker {
            let entry = entry.map_err(|e| ApplicationError::FilesystemError {
                path: e.path().unwrap_or(src).to_path_buf(),
                reason: format!("Failed to walk directory: {e}"),
            })?;
            let relative = entry
                .path()
                .strip_prefix(src)
                .map_err(|_| FixtureError::Internal {
                    message: format!(
                        "'{}' is not below '{}'",
                        entry.path().display(),
                        src.display()
                    ),
                })?;
            let target = dst.join(relative);

            let file_type = entry.file_type();
            if file_type.is_dir() {
                self.create_dir_all(&target)?;
            } else if file_type.is_symlink() {
                copy_symlink(entry.path(), &target)?;
                copied += 1;
            } else {
                fs::copy(entry.path(), &target)
                    .map_err(|e| map_io_error(&target, e, "copy file"))?;
                copied += 1;
            }
        }

        debug!(files = copied, "Tree copied");
        Ok(())
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> FixtureResult<()> {
        if let Some(parent) = dst.parent() {
            self.create_dir_all(parent)?;
        }
        fs::copy(src, dst)
            .map(|_| ())
            .map_err(|e| map_io_error(src, e, "copy file"))
    }

    fn read_to_string(&self, path: &Path) -> FixtureResult<String> {
        fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> FixtureResult<()> {
    let link = fs::read_link(src).map_err(|e| map_io_error(src, e, "read symlink"))?;
    if fs::symlink_metadata(dst).is_ok() {
        fs::remove_file(dst).map_err(|e| map_io_error(dst, e, "replace symlink"))?;
    }
    std::os::unix::fs::symlink(&link, dst).map_err(|e| map_io_error(dst, e, "create symlink"))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> FixtureResult<()> {
    fs::copy(src, dst)
        .map(|_| ())
        .map_err(|e| map_io_error(src, e, "copy file"))
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> FixtureError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn template_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("template/sub")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::write(root.join("copier.yml"), "name: world\n").unwrap();
        fs::write(root.join("template/README.md.jinja"), "Hello {{ name }}!\n").unwrap();
        fs::write(root.join("template/sub/file.txt"), "nested\n").unwrap();
        fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
        fs::write(root.join("target/debug/out"), "binary").unwrap();
        temp
    }

    #[test]
    fn copy_tree_skips_excluded_entries() {
        let source = template_tree();
        let dest = TempDir::new().unwrap();
        let mut exclude = IgnoreSet::new();
        exclude.push(".git").unwrap();
        exclude.push("target").unwrap();

        LocalFilesystem::new()
            .copy_tree(source.path(), dest.path(), &exclude)
            .unwrap();

        assert!(dest.path().join("copier.yml").is_file());
        assert_eq!(
            fs::read_to_string(dest.path().join("template/sub/file.txt")).unwrap(),
            "nested\n"
        );
        assert!(!dest.path().join(".git").exists());
        assert!(!dest.path().join("target").exists());
    }

    #[test]
    fn copy_tree_overwrites_existing_files() {
        let source = template_tree();
        let dest = TempDir::new().unwrap();
        fs::write(dest.path().join("copier.yml"), "stale\n").unwrap();

        LocalFilesystem::new()
            .copy_tree(source.path(), dest.path(), &IgnoreSet::new())
            .unwrap();

        assert_eq!(
            fs::read_to_string(dest.path().join("copier.yml")).unwrap(),
            "name: world\n"
        );
    }

    #[test]
    fn copy_file_creates_parents() {
        let source = template_tree();
        let dest = TempDir::new().unwrap();
        let target = dest.path().join("deep/nested/README.md.jinja");

        LocalFilesystem::new()
            .copy_file(&source.path().join("template/README.md.jinja"), &target)
            .unwrap();

        assert_eq!(fs::read_to_string(target).unwrap(), "Hello {{ name }}!\n");
    }

    #[test]
    fn read_missing_file_reports_path() {
        let dest = TempDir::new().unwrap();
        let missing = dest.path().join("nope.yml");

        let err = LocalFilesystem::new().read_to_string(&missing).unwrap_err();
        let FixtureError::Application(ApplicationError::FilesystemError { path, reason }) = err
        else {
            panic!("expected a filesystem error, got {err:?}");
        };
        assert_eq!(path, missing);
        assert!(reason.starts_with("Failed to read file"));
    }

    #[cfg(unix)]
    #[test]
    fn copy_tree_preserves_symlinks() {
        let source = template_tree();
        std::os::unix::fs::symlink("copier.yml", source.path().join("link.yml")).unwrap();
        let dest = TempDir::new().unwrap();

        LocalFilesystem::new()
            .copy_tree(source.path(), dest.path(), &IgnoreSet::new())
            .unwrap();

        let link = dest.path().join("link.yml");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(link).unwrap(), Path::new("copier.yml"));
    }
}

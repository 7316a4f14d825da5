//! Directory comparison with walkdir.
//!
//! Text files are compared after normalising CRLF to LF so that a checkout
//! with `core.autocrlf` does not break fixtures; anything that is not UTF-8
//! is compared byte for byte.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use copier_fixture_core::{
    application::{ApplicationError, ports::TreeComparator},
    domain::{IgnoreSet, TreeDiff, TreeDifference, unified},
    error::{FixtureError, FixtureResult},
};
use tracing::{debug, instrument};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
    Symlink,
}

/// Compares two trees on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkdirComparator;

impl WalkdirComparator {
    pub fn new() -> Self {
        Self
    }
}

impl TreeComparator for WalkdirComparator {
    #[instrument(skip_all, fields(actual = %actual.display(), expected = %expected.display()))]
    fn compare(
        &self,
        actual: &Path,
        expected: &Path,
        ignore: &IgnoreSet,
    ) -> FixtureResult<TreeDiff> {
        let actual_entries = entries(actual, ignore)?;
        let expected_entries = entries(expected, ignore)?;

        let paths: BTreeSet<&PathBuf> = actual_entries
            .keys()
            .chain(expected_entries.keys())
            .collect();
        let mut diff = TreeDiff::new();
        // Children of a missing or unexpected directory are not reported again.
        let mut reported_dir: Option<&Path> = None;

        for path in paths {
            if reported_dir.is_some_and(|dir| path.starts_with(dir)) {
                continue;
            }
            reported_dir = None;

            match (expected_entries.get(path), actual_entries.get(path)) {
                (Some(kind), None) => {
                    diff.push(TreeDifference::Missing(path.clone()));
                    if *kind == EntryKind::Dir {
                        reported_dir = Some(path.as_path());
                    }
                }
                (None, Some(kind)) => {
                    diff.push(TreeDifference::Unexpected(path.clone()));
                    if *kind == EntryKind::Dir {
                        reported_dir = Some(path.as_path());
                    }
                }
                (Some(expected_kind), Some(actual_kind)) if expected_kind != actual_kind => {
                    diff.push(TreeDifference::KindMismatch(path.clone()));
                    reported_dir = Some(path.as_path());
                }
                (Some(EntryKind::File), Some(EntryKind::File)) => {
                    if let Some(difference) =
                        compare_files(path, &expected.join(path), &actual.join(path))?
                    {
                        diff.push(difference);
                    }
                }
                (Some(EntryKind::Symlink), Some(EntryKind::Symlink)) => {
                    if let Some(difference) =
                        compare_links(path, &expected.join(path), &actual.join(path))?
                    {
                        diff.push(difference);
                    }
                }
                _ => {}
            }
        }

        debug!(differences = diff.len(), "Trees compared");
        Ok(diff)
    }
}

/// Relative paths under `root` that survive `ignore`, with their kind.
fn entries(root: &Path, ignore: &IgnoreSet) -> FixtureResult<BTreeMap<PathBuf, EntryKind>> {
    if !root.is_dir() {
        return Err(ApplicationError::FilesystemError {
            path: root.to_path_buf(),
            reason: "not a directory".into(),
        }
        .into());
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .map(|relative| !ignore.matches(relative))
                .unwrap_or(true)
        });

    let mut found = BTreeMap::new();
    for entry in walker {
        let entry = entry.map_err(|e| ApplicationError::FilesystemError {
            path: e.path().unwrap_or(root).to_path_buf(),
            reason: format!("Failed to walk directory: {e}"),
        })?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| FixtureError::Internal {
                message: format!("'{}' is not below '{}'", entry.path().display(), root.display()),
            })?
            .to_path_buf();

        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::File
        };
        found.insert(relative, kind);
    }
    Ok(found)
}

fn compare_files(
    relative: &Path,
    expected: &Path,
    actual: &Path,
) -> FixtureResult<Option<TreeDifference>> {
    let expected_bytes = read(expected)?;
    let actual_bytes = read(actual)?;
    if expected_bytes == actual_bytes {
        return Ok(None);
    }

    let (Ok(expected_text), Ok(actual_text)) = (
        String::from_utf8(expected_bytes),
        String::from_utf8(actual_bytes),
    ) else {
        return Ok(Some(TreeDifference::Content {
            path: relative.to_path_buf(),
            diff: None,
        }));
    };

    let expected_text = expected_text.replace("\r\n", "\n");
    let actual_text = actual_text.replace("\r\n", "\n");
    if expected_text == actual_text {
        return Ok(None);
    }

    let label = relative.display();
    Ok(Some(TreeDifference::Content {
        path: relative.to_path_buf(),
        diff: Some(unified(
            &expected_text,
            &actual_text,
            &format!("{label} (expected)"),
            &format!("{label} (actual)"),
        )),
    }))
}

fn compare_links(
    relative: &Path,
    expected: &Path,
    actual: &Path,
) -> FixtureResult<Option<TreeDifference>> {
    let expected_target = read_link(expected)?;
    let actual_target = read_link(actual)?;
    if expected_target == actual_target {
        return Ok(None);
    }

    let label = relative.display();
    Ok(Some(TreeDifference::Content {
        path: relative.to_path_buf(),
        diff: Some(unified(
            &format!("-> {}\n", expected_target.display()),
            &format!("-> {}\n", actual_target.display()),
            &format!("{label} (expected)"),
            &format!("{label} (actual)"),
        )),
    }))
}

fn read(path: &Path) -> FixtureResult<Vec<u8>> {
    fs::read(path).map_err(|e| {
        ApplicationError::FilesystemError {
            path: path.to_path_buf(),
            reason: format!("Failed to read file: {e}"),
        }
        .into()
    })
}

fn read_link(path: &Path) -> FixtureResult<PathBuf> {
    fs::read_link(path).map_err(|e| {
        ApplicationError::FilesystemError {
            path: path.to_path_buf(),
            reason: format!("Failed to read symlink: {e}"),
        }
        .into()
    })
}

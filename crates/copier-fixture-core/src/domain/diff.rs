//! Render-only mismatch reports.
//!
//! Nothing here is persisted: a report is built when an assertion fails and
//! turned into the text of the failure.

use std::fmt::{self, Write as _};
use std::path::PathBuf;

use owo_colors::{OwoColorize, Stream};
use similar::{ChangeTag, TextDiff};

use crate::domain::Answers;

/// Line diff of `expected` against `actual`, one marker per line.
///
/// Removed lines (`-`) are what the fixture expected, added lines (`+`)
/// what the project actually holds.
pub fn unified(expected: &str, actual: &str, expected_label: &str, actual_label: &str) -> String {
    let diff = TextDiff::from_lines(expected, actual);
    let mut out = String::new();

    let _ = writeln!(out, "--- {expected_label}");
    let _ = writeln!(out, "+++ {actual_label}");

    for group in diff.grouped_ops(3) {
        for op in group {
            for change in diff.iter_changes(&op) {
                let line = change.to_string_lossy();
                let line = line.trim_end_matches('\n');
                let rendered = match change.tag() {
                    ChangeTag::Delete => format!("-{line}")
                        .if_supports_color(Stream::Stderr, |t| t.red())
                        .to_string(),
                    ChangeTag::Insert => format!("+{line}")
                        .if_supports_color(Stream::Stderr, |t| t.green())
                        .to_string(),
                    ChangeTag::Equal => format!(" {line}"),
                };
                let _ = writeln!(out, "{rendered}");
            }
        }
    }

    out
}

/// Expected vs. actual answer mappings of one project.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswersDiff {
    pub label: String,
    pub expected: Answers,
    pub actual: Answers,
}

impl AnswersDiff {
    pub fn new(label: impl Into<String>, expected: Answers, actual: Answers) -> Self {
        Self {
            label: label.into(),
            expected,
            actual,
        }
    }

    pub fn expected_lines(&self) -> Vec<String> {
        self.expected.comparison_lines()
    }

    pub fn actual_lines(&self) -> Vec<String> {
        self.actual.comparison_lines()
    }

    /// Whether the filtered mappings differ.
    pub fn has_changes(&self) -> bool {
        self.expected.filtered() != self.actual.filtered()
    }
}

impl fmt::Display for AnswersDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}",
            "❌ Answers are different".if_supports_color(Stream::Stderr, |t| t.bold())
        )?;
        let expected = join_lines(&self.expected_lines());
        let actual = join_lines(&self.actual_lines());
        f.write_str(&unified(
            &expected,
            &actual,
            &format!("{} (expected)", self.label),
            &format!("{} (actual)", self.label),
        ))
    }
}

/// One way two directory trees can disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeDifference {
    /// Present in the expected tree only.
    Missing(PathBuf),
    /// Present in the project only.
    Unexpected(PathBuf),
    /// A file on one side, a directory on the other.
    KindMismatch(PathBuf),
    /// Both are files with different content. `diff` is absent for
    /// binary content.
    Content { path: PathBuf, diff: Option<String> },
}

impl fmt::Display for TreeDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "missing from project: {}", path.display()),
            Self::Unexpected(path) => write!(f, "not expected: {}", path.display()),
            Self::KindMismatch(path) => {
                write!(f, "file/directory mismatch: {}", path.display())
            }
            Self::Content { path, diff: None } => {
                write!(f, "binary content differs: {}", path.display())
            }
            Self::Content {
                path,
                diff: Some(diff),
            } => {
                writeln!(f, "content differs: {}", path.display())?;
                f.write_str(diff.trim_end())
            }
        }
    }
}

/// All differences between a project tree and its expected fixture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    differences: Vec<TreeDifference>,
}

impl TreeDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, difference: TreeDifference) {
        self.differences.push(difference);
    }

    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    pub fn len(&self) -> usize {
        self.differences.len()
    }

    pub fn differences(&self) -> &[TreeDifference] {
        &self.differences
    }
}

impl FromIterator<TreeDifference> for TreeDiff {
    fn from_iter<T: IntoIterator<Item = TreeDifference>>(iter: T) -> Self {
        Self {
            differences: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for TreeDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}",
            format!("❌ Directories differ ({} difference(s))", self.len())
                .if_supports_color(Stream::Stderr, |t| t.bold())
        )?;
        for difference in &self.differences {
            writeln!(f, "{difference}")?;
        }
        Ok(())
    }
}

fn join_lines(lines: &[String]) -> String {
    let mut joined = lines.join("\n");
    if !joined.is_empty() {
        joined.push('\n');
    }
    joined
}

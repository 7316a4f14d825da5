//! Ignore patterns for tree comparison and template copies.
//!
//! A pattern without `/` matches any single path component (`__pycache__`
//! ignores every such directory at any depth). A pattern containing `/`
//! matches the whole relative path segment by segment, with `**` spanning
//! any number of segments.

use std::path::{Component, Path};

use crate::domain::{ANSWERS_FILE, error::DomainError};

/// Names ignored by every directory comparison.
pub const DEFAULT_IGNORES: &[&str] = &[
    "RCS",
    "CVS",
    "tags",
    ".git",
    ".hg",
    ".bzr",
    "_darcs",
    "__pycache__",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    patterns: Vec<String>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// [`DEFAULT_IGNORES`] only.
    pub fn defaults() -> Self {
        Self {
            patterns: DEFAULT_IGNORES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// The set used when comparing a rendered project: defaults, the
    /// answers file, then the caller's extra patterns.
    pub fn for_project<S: AsRef<str>>(extra: &[S]) -> Result<Self, DomainError> {
        let mut set = Self::defaults();
        set.push(ANSWERS_FILE)?;
        for pattern in extra {
            set.push(pattern.as_ref())?;
        }
        Ok(set)
    }

    pub fn push(&mut self, pattern: impl Into<String>) -> Result<(), DomainError> {
        let pattern = pattern.into();
        let trimmed = pattern.trim_matches('/');
        if trimmed.is_empty() {
            return Err(DomainError::InvalidIgnorePattern { pattern });
        }
        self.patterns.push(trimmed.to_string());
        Ok(())
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether `relative` (a path below the compared root) is ignored.
    pub fn matches(&self, relative: &Path) -> bool {
        let segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if segments.is_empty() {
            return false;
        }

        self.patterns.iter().any(|pattern| {
            if pattern.contains('/') {
                let pattern_segments: Vec<&str> = pattern.split('/').collect();
                let path_segments: Vec<&str> = segments.iter().map(String::as_str).collect();
                match_segments(&pattern_segments, &path_segments)
            } else {
                segments.iter().any(|segment| wildcard(pattern, segment))
            }
        })
    }
}

fn match_segments(patterns: &[&str], paths: &[&str]) -> bool {
    match patterns.split_first() {
        None => paths.is_empty(),
        Some((&"**", rest)) => (0..=paths.len()).any(|idx| match_segments(rest, &paths[idx..])),
        Some((first, rest)) => match paths.split_first() {
            Some((segment, remaining)) => {
                wildcard(first, segment) && match_segments(rest, remaining)
            }
            None => false,
        },
    }
}

/// `*` matches any run of characters, `?` exactly one.
fn wildcard(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

//! Path normalization for option values that name files on disk.

use std::path::{Path, PathBuf};

use crate::error::{SubmitError, SubmitResult};

/// A normalized path-like option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathArg {
    /// A single path (or the empty string, passed through unchanged).
    One(String),
    /// An ordered list of paths, from a delimited string or a wildcard.
    Many(Vec<String>),
}

/// Normalize a path-like option value.
///
/// - empty input is returned unchanged;
/// - a comma-delimited string (optionally wrapped in `[`/`]`) is split and
///   each element normalized, returning the flattened ordered list;
/// - a string containing a wildcard whose parent directory exists expands
///   to the matching absolute paths;
/// - an existing entry becomes its absolute path, with a trailing `/` for
///   directories;
/// - anything else is an invalid path.
///
/// Read-only: touches the filesystem only for existence checks and
/// directory listing.
pub fn normalize(input: &str) -> SubmitResult<PathArg> {
    if input.is_empty() {
        return Ok(PathArg::One(String::new()));
    }

    let stripped = input.trim_start_matches('[').trim_end_matches(']');
    if stripped.contains(',') {
        let mut parts = Vec::new();
        for part in stripped.split(',') {
            match normalize(part)? {
                PathArg::One(p) => parts.push(p),
                PathArg::Many(ps) => parts.extend(ps),
            }
        }
        return Ok(PathArg::Many(parts));
    }

    if has_wildcard(input) {
        let path = Path::new(input);
        // A bare pattern like `*.dat` has an empty parent; treat it as
        // the working directory.
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let parent = std::path::absolute(parent)?;
        if parent.is_dir() {
            let pattern = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Ok(PathArg::Many(expand_wildcard(&parent, &pattern)?));
        }
        return Err(SubmitError::InvalidPath(input.to_string()));
    }

    let abs = std::path::absolute(input)?;
    if abs.exists() {
        let mut rendered = abs.to_string_lossy().into_owned();
        if abs.is_dir() && !rendered.ends_with('/') {
            rendered.push('/');
        }
        return Ok(PathArg::One(rendered));
    }

    Err(SubmitError::InvalidPath(input.to_string()))
}

fn has_wildcard(s: &str) -> bool {
    s.contains('*') || s.contains('?')
}

/// List entries of `dir` whose names match `pattern`, as sorted absolute paths.
fn expand_wildcard(dir: &Path, pattern: &str) -> SubmitResult<Vec<String>> {
    let pattern: Vec<char> = pattern.chars().collect();
    let mut matches = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let candidate: Vec<char> = name.chars().collect();
        if wildcard_match(&pattern, &candidate) {
            matches.push(dir.join(&name).to_string_lossy().into_owned());
        }
    }
    matches.sort();
    Ok(matches)
}

/// Shell-style match: `*` matches any run of characters, `?` exactly one.
fn wildcard_match(pattern: &[char], input: &[char]) -> bool {
    match (pattern.first(), input.first()) {
        (None, None) => true,
        (Some('*'), _) => {
            // Either consume nothing from the input or one character.
            wildcard_match(&pattern[1..], input)
                || (!input.is_empty() && wildcard_match(pattern, &input[1..]))
        }
        (Some('?'), Some(_)) => wildcard_match(&pattern[1..], &input[1..]),
        (Some(p), Some(c)) if p == c => wildcard_match(&pattern[1..], &input[1..]),
        _ => false,
    }
}

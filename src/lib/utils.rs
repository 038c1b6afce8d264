use std::fs;
use std::path::{Path, PathBuf};

/// Characters that are never allowed inside a single path segment
pub const ILLEGAL_SEGMENT_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replacement used for every illegal, control or whitespace character
pub const SEGMENT_REPLACEMENT: char = '_';

/// Sanitize a tag value so it can be used as one directory name.
/// Surrounding whitespace is dropped, inner whitespace becomes `_`.
/// Applying it twice gives the same result as applying it once.
///
/// Input made only of whitespace comes back empty. Callers building paths pass
/// the result through [`crate::directory::segment_or_unknown`], which maps an
/// empty segment to `Unknown`.
pub fn sanitize_path_segment(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            c if ILLEGAL_SEGMENT_CHARS.contains(&c) => SEGMENT_REPLACEMENT,
            c if c.is_control() || c.is_whitespace() => SEGMENT_REPLACEMENT,
            c => c,
        })
        .collect()
}

/// Expand a leading `~` in a configured path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Absolute form of `path`, so two spellings of one directory compare equal.
/// Existing paths are canonicalized; others are made absolute against the
/// current directory without touching the filesystem.
pub fn resolve_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

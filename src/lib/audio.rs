use rustc_hash::FxHashSet;
use std::path::Path;

/// Audio formats organized when no configuration overrides them
/// Extensions are lowercase and carry the leading dot
pub const DEFAULT_SUPPORTED_FORMATS: &[&str] = &[".mp3", ".flac", ".m4a", ".wav", ".aac"];

/// Normalize an extension to lowercase with a leading dot ("MP3" -> ".mp3")
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// Dotted, lowercase extension of a path, if it has one
pub fn extension_of<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(normalize_extension)
}

/// Set of extensions eligible for organizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedFormats {
    extensions: FxHashSet<String>,
}

impl SupportedFormats {
    pub fn contains(&self, ext: &str) -> bool {
        self.extensions.contains(&normalize_extension(ext))
    }

    /// Check if a file path has a supported extension (case-insensitive)
    pub fn contains_path<P: AsRef<Path>>(&self, path: P) -> bool {
        extension_of(path).is_some_and(|ext| self.extensions.contains(&ext))
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Extensions in sorted order, for display
    pub fn sorted(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extensions.iter().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

impl Default for SupportedFormats {
    fn default() -> Self {
        DEFAULT_SUPPORTED_FORMATS.iter().copied().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SupportedFormats {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            extensions: iter
                .into_iter()
                .map(|s| normalize_extension(s.as_ref()))
                .collect(),
        }
    }
}

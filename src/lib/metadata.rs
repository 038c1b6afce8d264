use crate::error::{OrganizeError, Result};
use crate::utils::sanitize_path_segment;
use lofty::file::TaggedFileExt;
use lofty::tag::{ItemKey, Tag};
use std::path::Path;
use tracing::debug;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// A tag field that may carry one or several values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Single(String),
    Multiple(Vec<String>),
}

impl TagValue {
    /// Build from however many values a tag returned; `None` when there were none
    pub fn from_values(mut values: Vec<String>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(TagValue::Single),
            _ => Some(TagValue::Multiple(values)),
        }
    }

    /// All values joined with ", ", blank entries dropped
    fn joined(&self) -> String {
        match self {
            TagValue::Single(s) => s.trim().to_string(),
            TagValue::Multiple(values) => values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// The first value only
    fn first(&self) -> String {
        match self {
            TagValue::Single(s) => s.trim().to_string(),
            TagValue::Multiple(values) => values
                .first()
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Single(value.to_string())
    }
}

/// Tag fields as read from a file, before any fallback is applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTags {
    pub album_artist: Option<TagValue>,
    pub artist: Option<TagValue>,
    pub album: Option<String>,
}

/// Definite display identity of a track; both fields are non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedIdentity {
    pub album_artist: String,
    pub album: String,
}

/// Identity with every field safe to use as a single path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedIdentity {
    pub album_artist: String,
    pub album: String,
}

impl NormalizedIdentity {
    pub fn sanitized(&self) -> SanitizedIdentity {
        SanitizedIdentity {
            album_artist: sanitize_path_segment(&self.album_artist),
            album: sanitize_path_segment(&self.album),
        }
    }
}

/// Fallback labels and field preference used when normalizing tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizePolicy {
    pub unknown_artist: String,
    pub unknown_album: String,
    /// Consult the album-artist field before the track artist
    pub prefer_album_artist: bool,
}

impl Default for NormalizePolicy {
    fn default() -> Self {
        Self {
            unknown_artist: UNKNOWN_ARTIST.to_string(),
            unknown_album: UNKNOWN_ALBUM.to_string(),
            prefer_album_artist: true,
        }
    }
}

/// Resolve raw tags into an album-artist/album pair. Never fails.
pub fn normalize(tags: &RawTags, policy: &NormalizePolicy) -> NormalizedIdentity {
    let from_album_artist = tags
        .album_artist
        .as_ref()
        .map(TagValue::joined)
        .filter(|s| !s.is_empty());
    let from_artist = tags
        .artist
        .as_ref()
        .map(TagValue::first)
        .filter(|s| !s.is_empty());

    let album_artist = if policy.prefer_album_artist {
        from_album_artist.or(from_artist)
    } else {
        from_artist.or(from_album_artist)
    }
    .unwrap_or_else(|| policy.unknown_artist.clone());

    let album = tags
        .album
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| policy.unknown_album.clone());

    NormalizedIdentity {
        album_artist,
        album,
    }
}

/// Source of tag metadata for a single file
pub trait MetadataReader {
    /// Read the tag fields of `path`.
    /// Fails with `FileNotFound` when the file is gone and `MetadataExtraction`
    /// when its tag block cannot be parsed.
    fn read_tags(&self, path: &Path) -> Result<RawTags>;
}

/// Reads tags through `lofty`
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyReader;

impl MetadataReader for LoftyReader {
    fn read_tags(&self, path: &Path) -> Result<RawTags> {
        if !path.exists() {
            return Err(OrganizeError::not_found(path));
        }

        let tagged_file = lofty::read_from_path(path).map_err(|e| {
            OrganizeError::metadata(format!(
                "Unable to extract metadata from {}: {}",
                path.display(),
                e
            ))
        })?;

        // Primary tag first, then whatever other tags the container carries
        let tags: Vec<&Tag> = tagged_file
            .primary_tag()
            .into_iter()
            .chain(tagged_file.tags().iter())
            .collect();

        let raw = RawTags {
            album_artist: first_values(&tags, &ItemKey::AlbumArtist),
            artist: first_values(&tags, &ItemKey::TrackArtist),
            album: tags
                .iter()
                .find_map(|tag| tag.get_string(&ItemKey::AlbumTitle))
                .map(str::to_string),
        };

        debug!("Extracted metadata from {}: {:?}", path.display(), raw);
        Ok(raw)
    }
}

/// Values of `key` from the first tag that has any
fn first_values(tags: &[&Tag], key: &ItemKey) -> Option<TagValue> {
    tags.iter().find_map(|tag| {
        TagValue::from_values(tag.get_strings(key).map(str::to_string).collect())
    })
}

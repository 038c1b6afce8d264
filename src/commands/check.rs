use anyhow::{Context, Result};
use music_sorter::{Config, LoftyReader, MetadataReader, Organizer};
use std::path::Path;

/// Describe where a single file would be organized to, without moving it
pub fn check_file<R: MetadataReader>(config: &Config, reader: R, file: &Path) -> Result<String> {
    if !config.formats().contains_path(file) {
        return Ok(format!(
            "{}: unsupported file type (supported: {})",
            file.display(),
            config.formats().sorted().join(", ")
        ));
    }

    let processed = Organizer::new(config, reader)
        .resolve(file, &config.destination_path)
        .with_context(|| format!("Failed to check '{}'", file.display()))?;

    Ok(format!(
        "{}\n  album artist: {}\n  album:        {}\n  target:       {}",
        file.display(),
        processed.identity.album_artist,
        processed.identity.album,
        processed.target_directory.display()
    ))
}

/// `check` subcommand backed by the tag library
pub fn check_with_tags(config: &Config, file: &Path) -> Result<String> {
    check_file(config, LoftyReader, file)
}

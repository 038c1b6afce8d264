use anyhow::Result;
use music_sorter::{Config, LoftyReader, OrganizeError, OrganizeStats, Organizer};
use tracing::info;

/// Organize the configured source directory into the destination tree
pub fn organize_music_library(
    config: &Config,
    dry_run: bool,
) -> std::result::Result<OrganizeStats, OrganizeError> {
    info!(
        "Supported formats: {}",
        config.formats().sorted().join(", ")
    );

    Organizer::new(config, LoftyReader)
        .dry_run(dry_run)
        .organize(&config.source_path, &config.destination_path)
}

/// Summary printed once the batch has run
pub fn format_summary(stats: &OrganizeStats, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string(stats)?);
    }

    Ok(format!(
        "Organized {} files ({} failed, {} skipped)",
        stats.successful, stats.failed, stats.skipped
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_summary() -> Result<()> {
        let stats = OrganizeStats {
            successful: 3,
            failed: 1,
            skipped: 2,
        };

        assert_eq!(
            format_summary(&stats, false)?,
            "Organized 3 files (1 failed, 2 skipped)"
        );
        assert_eq!(
            format_summary(&stats, true)?,
            r#"{"successful":3,"failed":1,"skipped":2}"#
        );

        Ok(())
    }

    #[test]
    fn test_organize_music_library_empty_source() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut config = Config::default();
        config.source_path = temp_dir.path().join("Music");
        config.destination_path = temp_dir.path().join("Sorted");
        fs::create_dir_all(&config.source_path)?;

        let stats = organize_music_library(&config, false)?;

        assert_eq!(stats, OrganizeStats::default());
        Ok(())
    }

    #[test]
    fn test_organize_music_library_corrupt_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut config = Config::default();
        config.source_path = temp_dir.path().join("Music");
        config.destination_path = temp_dir.path().join("Sorted");
        fs::create_dir_all(&config.source_path)?;
        fs::write(config.source_path.join("broken.flac"), b"not really flac")?;

        let stats = organize_music_library(&config, false)?;

        assert_eq!(stats.failed, 1);
        assert!(config.source_path.join("broken.flac").exists());
        assert!(!config.destination_path.exists());
        Ok(())
    }
}

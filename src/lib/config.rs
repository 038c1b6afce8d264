//! Configuration loading and validation
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! `MUSIC_SORTER_*` environment variables. Command-line arguments are applied
//! on top by the binary. The result is an ordinary value passed to the
//! organizer; nothing here is global.

use crate::audio::{normalize_extension, SupportedFormats, DEFAULT_SUPPORTED_FORMATS};
use crate::error::{OrganizeError, Result};
use crate::metadata::{NormalizePolicy, UNKNOWN_ALBUM, UNKNOWN_ARTIST};
use crate::utils::{expand_path, resolve_path};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

pub const ENV_CONFIG_PATH: &str = "MUSIC_SORTER_CONFIG";
pub const ENV_CONFIG_PATH_LEGACY: &str = "CONFIG_PATH";
pub const ENV_SOURCE_PATH: &str = "MUSIC_SORTER_SOURCE_PATH";
pub const ENV_DESTINATION_PATH: &str = "MUSIC_SORTER_DESTINATION_PATH";
pub const ENV_SUPPORTED_FORMATS: &str = "MUSIC_SORTER_SUPPORTED_FORMATS";
pub const ENV_LOG_LEVEL: &str = "MUSIC_SORTER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "MUSIC_SORTER_LOG_DIR";

pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub supported_formats: Vec<String>,
    pub metadata: MetadataConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetadataConfig {
    pub prefer_album_artist: bool,
    pub unknown_artist_name: String,
    pub unknown_album_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    pub level: String,
    pub directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("./music"),
            destination_path: PathBuf::from("./sorted"),
            supported_formats: DEFAULT_SUPPORTED_FORMATS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            metadata: MetadataConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            prefer_album_artist: true,
            unknown_artist_name: UNKNOWN_ARTIST.to_string(),
            unknown_album_name: UNKNOWN_ALBUM.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: PathBuf::from("logs"),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::load_with(config_file, |key| std::env::var(key).ok())
    }

    /// Load configuration, reading variables through `env`
    ///
    /// An explicitly named file (argument or environment) must exist; the
    /// default `config.json` in the working directory is optional.
    pub fn load_with<F>(config_file: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit = config_file.map(Path::to_path_buf).or_else(|| {
            env(ENV_CONFIG_PATH)
                .or_else(|| env(ENV_CONFIG_PATH_LEGACY))
                .filter(|p| !p.trim().is_empty())
                .map(|p| expand_path(&p))
        });

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(env);
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON file; keys it omits keep their built-in defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            OrganizeError::configuration_with(
                format!("Failed to read configuration file {}", path.display()),
                e,
            )
        })?;

        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            OrganizeError::configuration_with(
                format!("Invalid configuration file {}", path.display()),
                e,
            )
        })?;

        debug!("Loaded configuration file: {}", path.display());
        Ok(config)
    }

    /// Overlay `MUSIC_SORTER_*` variables; blank values are ignored
    pub fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(source) = var(ENV_SOURCE_PATH) {
            self.source_path = PathBuf::from(source);
        }
        if let Some(dest) = var(ENV_DESTINATION_PATH) {
            self.destination_path = PathBuf::from(dest);
        }
        if let Some(formats) = var(ENV_SUPPORTED_FORMATS) {
            self.supported_formats = formats
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(level) = var(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(dir) = var(ENV_LOG_DIR) {
            self.logging.directory = PathBuf::from(dir);
        }
    }

    /// Override the source and destination, as given on the command line
    pub fn override_paths(&mut self, source: Option<PathBuf>, destination: Option<PathBuf>) {
        if let Some(source) = source {
            self.source_path = source;
        }
        if let Some(destination) = destination {
            self.destination_path = destination;
        }
    }

    /// Check and normalize the configuration. Safe to call more than once.
    pub fn validate(&mut self) -> Result<()> {
        if self.source_path.as_os_str().is_empty() {
            return Err(OrganizeError::configuration("sourcePath must not be empty"));
        }
        if self.destination_path.as_os_str().is_empty() {
            return Err(OrganizeError::configuration(
                "destinationPath must not be empty",
            ));
        }

        self.source_path = resolve_path(&expand(&self.source_path));
        self.destination_path = resolve_path(&expand(&self.destination_path));
        self.logging.directory = resolve_path(&expand(&self.logging.directory));

        if self.source_path == self.destination_path {
            return Err(OrganizeError::configuration(format!(
                "sourcePath and destinationPath are the same directory: {}",
                self.source_path.display()
            )));
        }

        let mut formats: Vec<String> = self
            .supported_formats
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty() && *f != ".")
            .map(normalize_extension)
            .collect();
        formats.sort();
        formats.dedup();
        if formats.is_empty() {
            return Err(OrganizeError::configuration(
                "supportedFormats must list at least one extension",
            ));
        }
        self.supported_formats = formats;

        let level = self.logging.level.trim().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(OrganizeError::configuration(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }
        self.logging.level = level;

        if self.metadata.unknown_artist_name.trim().is_empty() {
            return Err(OrganizeError::configuration(
                "metadata.unknownArtistName must not be empty",
            ));
        }
        if self.metadata.unknown_album_name.trim().is_empty() {
            return Err(OrganizeError::configuration(
                "metadata.unknownAlbumName must not be empty",
            ));
        }

        Ok(())
    }

    pub fn formats(&self) -> SupportedFormats {
        self.supported_formats.iter().collect()
    }

    pub fn normalize_policy(&self) -> NormalizePolicy {
        NormalizePolicy {
            unknown_artist: self.metadata.unknown_artist_name.trim().to_string(),
            unknown_album: self.metadata.unknown_album_name.trim().to_string(),
            prefer_album_artist: self.metadata.prefer_album_artist,
        }
    }
}

fn expand(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => expand_path(s),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.source_path, PathBuf::from("./music"));
        assert_eq!(config.destination_path, PathBuf::from("./sorted"));
        assert_eq!(config.metadata.unknown_artist_name, "Unknown Artist");
        assert_eq!(config.metadata.unknown_album_name, "Unknown Album");
        assert_eq!(config.logging.level, "info");
        assert!(config.formats().contains(".aac"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "sourcePath": "/in", "metadata": { "unknownAlbumName": "Singles" } }"#,
        )?;

        let config = Config::load_with(Some(&path), env_from(&[]))?;

        assert_eq!(config.source_path, PathBuf::from("/in"));
        assert!(config.destination_path.is_absolute());
        assert!(config.destination_path.ends_with("sorted"));
        assert_eq!(config.metadata.unknown_album_name, "Singles");
        assert_eq!(config.metadata.unknown_artist_name, "Unknown Artist");
        assert!(config.metadata.prefer_album_artist);
        Ok(())
    }

    #[test]
    fn test_env_overrides_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "sourcePath": "/from-file", "destinationPath": "/out-file", "logging": { "level": "warn" } }"#,
        )?;
        let path_str = path.display().to_string();

        let config = Config::load_with(
            None,
            env_from(&[
                (ENV_CONFIG_PATH, path_str.as_str()),
                (ENV_SOURCE_PATH, "/from-env"),
                (ENV_LOG_LEVEL, "DEBUG"),
                (ENV_SUPPORTED_FORMATS, "MP3, ogg"),
            ]),
        )?;

        assert_eq!(config.source_path, PathBuf::from("/from-env"));
        assert_eq!(config.destination_path, PathBuf::from("/out-file"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.supported_formats, vec![".mp3", ".ogg"]);
        Ok(())
    }

    #[test]
    fn test_cli_overrides_env() -> Result<()> {
        let mut config = Config::default();
        config.apply_env(env_from(&[(ENV_SOURCE_PATH, "/from-env")]));
        config.override_paths(Some(PathBuf::from("/from-cli")), None);
        config.validate()?;

        assert_eq!(config.source_path, PathBuf::from("/from-cli"));
        Ok(())
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(env_from(&[(ENV_DESTINATION_PATH, "  ")]));
        assert_eq!(config.destination_path, PathBuf::from("./sorted"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let err = Config::load_with(Some(&temp_dir.path().join("nope.json")), env_from(&[]))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
        Ok(())
    }

    #[test]
    fn test_invalid_json_is_an_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json")?;

        let err = Config::load_with(Some(&path), env_from(&[])).unwrap_err();
        assert!(err.to_string().starts_with("Configuration error"));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.supported_formats = vec![" ".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.destination_path = config.source_path.clone();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.metadata.unknown_artist_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_same_directory_spelled_differently() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let music = temp_dir.path().join("music");
        fs::create_dir_all(&music)?;

        let mut config = Config::default();
        config.source_path = music.clone();
        config.destination_path = music.join("..").join("music").join(".");
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.source_path = PathBuf::from("music");
        config.destination_path = PathBuf::from("./music");
        assert!(config.validate().is_err());
        Ok(())
    }

    #[test]
    fn test_validate_resolves_paths() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let music = temp_dir.path().join("music");
        fs::create_dir_all(&music)?;

        let mut config = Config::default();
        config.source_path = music.join("..").join("music");
        config.destination_path = music.join("..").join("sorted");
        config.validate()?;

        assert_eq!(config.source_path, fs::canonicalize(&music)?);
        assert!(config.destination_path.is_absolute());
        assert!(config.logging.directory.is_absolute());
        Ok(())
    }

    #[test]
    fn test_validate_normalizes_formats() -> Result<()> {
        let mut config = Config::default();
        config.supported_formats = vec!["FLAC".into(), ".flac".into(), ".Mp3".into()];
        config.validate()?;
        config.validate()?;
        assert_eq!(config.supported_formats, vec![".flac", ".mp3"]);
        Ok(())
    }

    #[test]
    fn test_normalize_policy() {
        let mut config = Config::default();
        config.metadata.prefer_album_artist = false;
        config.metadata.unknown_artist_name = " Nobody ".to_string();

        let policy = config.normalize_policy();
        assert!(!policy.prefer_album_artist);
        assert_eq!(policy.unknown_artist, "Nobody");
        assert_eq!(policy.unknown_album, "Unknown Album");
    }
}

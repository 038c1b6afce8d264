//! Error types for the organizer
//!
//! Every failure the pipeline can produce is one variant of [`OrganizeError`].
//! Callers dispatch on [`OrganizeError::kind`] rather than on message text.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Discriminant of an [`OrganizeError`], used for dispatch and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    DirectoryOperation,
    FileProcessing,
    FileNotFound,
    MetadataExtraction,
    InvalidFileType,
}

#[derive(Error, Debug)]
pub enum OrganizeError {
    /// Bad or missing configuration, fatal at startup
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Enumeration or target-directory creation failure
    #[error("Directory operation failed: {message}")]
    DirectoryOperation {
        message: String,
        #[source]
        source: Option<io::Error>,
    },

    /// Move failure, or the aggregate wrapper for a fatal batch error
    #[error("{message}")]
    FileProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to extract metadata: {message}")]
    MetadataExtraction { message: String },

    #[error("Unsupported file type: {extension}")]
    InvalidFileType { extension: String },
}

pub type Result<T> = std::result::Result<T, OrganizeError>;

impl OrganizeError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    pub fn configuration_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn directory(message: impl Into<String>, source: Option<io::Error>) -> Self {
        Self::DirectoryOperation {
            message: message.into(),
            source,
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::FileProcessing {
            message: message.into(),
            source: None,
        }
    }

    pub fn processing_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::FileProcessing {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn not_found(path: &Path) -> Self {
        Self::FileNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn metadata(message: impl Into<String>) -> Self {
        Self::MetadataExtraction {
            message: message.into(),
        }
    }

    pub fn invalid_file_type(extension: impl Into<String>) -> Self {
        Self::InvalidFileType {
            extension: extension.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::DirectoryOperation { .. } => ErrorKind::DirectoryOperation,
            Self::FileProcessing { .. } => ErrorKind::FileProcessing,
            Self::FileNotFound { .. } => ErrorKind::FileNotFound,
            Self::MetadataExtraction { .. } => ErrorKind::MetadataExtraction,
            Self::InvalidFileType { .. } => ErrorKind::InvalidFileType,
        }
    }

    /// HTTP-style status code: 400 for caller input, 404 for missing resources,
    /// 500 for operational failures
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::FileNotFound => 404,
            ErrorKind::MetadataExtraction | ErrorKind::InvalidFileType => 400,
            ErrorKind::Configuration
            | ErrorKind::DirectoryOperation
            | ErrorKind::FileProcessing => 500,
        }
    }

    /// Process exit code for the CLI (sysexits.h values where one fits)
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Configuration => 78,
            ErrorKind::FileProcessing | ErrorKind::DirectoryOperation => 74,
            ErrorKind::FileNotFound => 66,
            ErrorKind::MetadataExtraction | ErrorKind::InvalidFileType => 65,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(OrganizeError::configuration("x").status_code(), 500);
        assert_eq!(OrganizeError::directory("x", None).status_code(), 500);
        assert_eq!(OrganizeError::processing("x").status_code(), 500);
        assert_eq!(
            OrganizeError::not_found(Path::new("/a.mp3")).status_code(),
            404
        );
        assert_eq!(OrganizeError::metadata("x").status_code(), 400);
        assert_eq!(OrganizeError::invalid_file_type(".txt").status_code(), 400);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            OrganizeError::not_found(Path::new("/music/a.mp3")).to_string(),
            "File not found: /music/a.mp3"
        );
        assert_eq!(
            OrganizeError::invalid_file_type(".txt").to_string(),
            "Unsupported file type: .txt"
        );
        assert_eq!(
            OrganizeError::processing("Failed to organize music collection").to_string(),
            "Failed to organize music collection"
        );
    }

    #[test]
    fn test_source_is_kept() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = OrganizeError::processing_with("Unable to move file", io_err);
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("denied"));
        assert_eq!(err.kind(), ErrorKind::FileProcessing);
    }

    #[test]
    fn test_exit_codes_distinguish_fatal_errors() {
        assert_ne!(
            OrganizeError::configuration("x").exit_code(),
            OrganizeError::processing("x").exit_code()
        );
        assert_ne!(OrganizeError::processing("x").exit_code(), 0);
    }
}

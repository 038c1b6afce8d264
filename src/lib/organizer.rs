//! Batch organizer
//!
//! Walks a source tree and moves every supported audio file to
//! `<destination>/<album artist>/<album>/<file name>`. Files are handled one at
//! a time; a failure on one file is counted and logged, never fatal to the batch.

use crate::audio::{extension_of, SupportedFormats};
use crate::config::Config;
use crate::directory::{move_file, resolve_target_directory};
use crate::error::{OrganizeError, Result};
use crate::metadata::{normalize, MetadataReader, NormalizePolicy, NormalizedIdentity};
use crate::utils::resolve_path;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

/// Message of the single error returned when a batch cannot run at all
pub const FATAL_MESSAGE: &str = "Failed to organize music collection";

/// Outcome counts of one organize run.
/// `successful + failed` is the number of files whose processing was attempted;
/// unsupported files only count toward `skipped`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrganizeStats {
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl OrganizeStats {
    pub fn attempted(&self) -> usize {
        self.successful + self.failed
    }
}

/// A file whose destination has been worked out but not yet moved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    pub original_path: PathBuf,
    pub target_directory: PathBuf,
    pub identity: NormalizedIdentity,
}

/// How a single file left the pipeline
#[derive(Debug)]
pub enum FileOutcome {
    Moved(PathBuf),
    Skipped,
    Failed(OrganizeError),
}

pub struct Organizer<R> {
    reader: R,
    formats: SupportedFormats,
    policy: NormalizePolicy,
    dry_run: bool,
    /// Destinations already claimed during a dry run
    planned: RefCell<FxHashSet<PathBuf>>,
}

impl<R: MetadataReader> Organizer<R> {
    pub fn new(config: &Config, reader: R) -> Self {
        Self {
            reader,
            formats: config.formats(),
            policy: config.normalize_policy(),
            dry_run: false,
            planned: RefCell::default(),
        }
    }

    /// Log planned moves instead of touching the filesystem
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Organize every file under `source` into `destination`
    ///
    /// Returns the per-file counts. Only a failure to enumerate `source`
    /// itself is returned as an error.
    pub fn organize(&self, source: &Path, destination: &Path) -> Result<OrganizeStats> {
        info!(
            "Starting music organization: {} -> {}",
            source.display(),
            destination.display()
        );

        let files = enumerate_files(source, destination).map_err(|e| {
            error!("Failed to organize music: {}", e);
            OrganizeError::processing_with(FATAL_MESSAGE, e)
        })?;
        info!("Found {} files to process", files.len());
        self.planned.borrow_mut().clear();

        let mut stats = OrganizeStats::default();
        for file in &files {
            match self.process_file(file, destination) {
                FileOutcome::Moved(dest) => {
                    stats.successful += 1;
                    debug!("Organized {} as {}", file.display(), dest.display());
                }
                FileOutcome::Skipped => stats.skipped += 1,
                FileOutcome::Failed(e) => {
                    stats.failed += 1;
                    error!("Failed to process file {}: {}", file.display(), e);
                }
            }
        }

        info!(
            "Music organization completed: {} successful, {} failed, {} skipped",
            stats.successful, stats.failed, stats.skipped
        );
        if self.dry_run {
            info!("This was a dry run. No files were actually moved.");
        }

        Ok(stats)
    }

    /// Run one file through type check, metadata, path resolution and move
    pub fn process_file(&self, file: &Path, destination: &Path) -> FileOutcome {
        if !self.formats.contains_path(file) {
            let ext = extension_of(file).unwrap_or_default();
            warn!(
                "Skipping unsupported file: {} ({})",
                file.display(),
                OrganizeError::invalid_file_type(ext)
            );
            return FileOutcome::Skipped;
        }

        let moved = self
            .resolve(file, destination)
            .and_then(|processed| self.relocate(&processed));

        match moved {
            Ok(dest) => FileOutcome::Moved(dest),
            Err(e) => FileOutcome::Failed(e),
        }
    }

    /// Read tags and work out where `file` belongs, without moving it
    pub fn resolve(&self, file: &Path, destination: &Path) -> Result<ProcessedFile> {
        let tags = self.reader.read_tags(file)?;
        let identity = normalize(&tags, &self.policy);
        let target_directory = resolve_target_directory(destination, &identity.sanitized());

        debug!(
            "Resolved {} as {} / {}",
            file.display(),
            identity.album_artist,
            identity.album
        );

        Ok(ProcessedFile {
            original_path: file.to_path_buf(),
            target_directory,
            identity,
        })
    }

    fn relocate(&self, processed: &ProcessedFile) -> Result<PathBuf> {
        let file_name = processed.original_path.file_name().ok_or_else(|| {
            OrganizeError::processing(format!(
                "File '{}' has no filename",
                processed.original_path.display()
            ))
        })?;

        if !self.dry_run {
            return move_file(
                &processed.original_path,
                &processed.target_directory,
                file_name,
                false,
            );
        }

        // A real run would fail the second file bound for the same path
        let dest_path = processed.target_directory.join(file_name);
        if self.planned.borrow().contains(&dest_path) {
            return Err(OrganizeError::processing(format!(
                "Unable to move file from {} to {}: destination already planned",
                processed.original_path.display(),
                dest_path.display()
            )));
        }

        let dest_path = move_file(
            &processed.original_path,
            &processed.target_directory,
            file_name,
            true,
        )?;
        self.planned.borrow_mut().insert(dest_path.clone());
        Ok(dest_path)
    }
}

/// List regular files under `source`, recursively, sorted by name within each
/// directory. The `destination` subtree is skipped when it lies inside `source`,
/// however either path is spelled.
pub fn enumerate_files(source: &Path, destination: &Path) -> Result<Vec<PathBuf>> {
    if !source.is_dir() {
        return Err(OrganizeError::directory(
            format!("Unable to read directory: {}", source.display()),
            None,
        ));
    }

    let destination = resolve_path(destination);
    let mut files = Vec::new();
    let walker = WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || resolve_path(entry.path()) != destination
        });

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) if e.depth() == 0 => {
                return Err(OrganizeError::directory(
                    format!("Unable to read directory: {}", source.display()),
                    e.into_io_error(),
                ));
            }
            Err(e) => warn!("Skipping unreadable entry under {}: {}", source.display(), e),
        }
    }

    Ok(files)
}

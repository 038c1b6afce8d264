//! Directory operations and file relocation for the organizer

use crate::error::{OrganizeError, Result};
use crate::metadata::SanitizedIdentity;
use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Label used for a path segment that sanitized down to nothing
pub const UNKNOWN_SEGMENT: &str = "Unknown";

/// Replace segments that would be empty or would walk the tree (`.`/`..`)
pub fn segment_or_unknown(segment: &str) -> &str {
    match segment {
        "" | "." | ".." => UNKNOWN_SEGMENT,
        s => s,
    }
}

/// Target directory for a track: `<destination>/<album artist>/<album>`
pub fn resolve_target_directory(destination: &Path, identity: &SanitizedIdentity) -> PathBuf {
    destination
        .join(segment_or_unknown(&identity.album_artist))
        .join(segment_or_unknown(&identity.album))
}

/// Create a directory and its missing ancestors; an existing directory is fine
pub fn ensure_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| {
        OrganizeError::directory(
            format!("Unable to create directory: {}", path.display()),
            Some(e),
        )
    })?;
    debug!("Created directory: {}", path.display());

    Ok(())
}

/// Move a file into `target_dir`, keeping its file name
/// Returns the destination path. An existing destination is never overwritten.
pub fn move_file(
    source: &Path,
    target_dir: &Path,
    file_name: &OsStr,
    dry_run: bool,
) -> Result<PathBuf> {
    let dest_path = target_dir.join(file_name);

    if !source.is_file() {
        return Err(OrganizeError::processing(format!(
            "Unable to move file from {} to {}: source file not found",
            source.display(),
            dest_path.display()
        )));
    }

    // Already where it belongs
    if source == dest_path {
        return Ok(dest_path);
    }

    if dest_path.symlink_metadata().is_ok() {
        return Err(OrganizeError::processing(format!(
            "Unable to move file from {} to {}: destination already exists",
            source.display(),
            dest_path.display()
        )));
    }

    if dry_run {
        info!(
            "Would move: {} -> {}",
            source.display(),
            dest_path.display()
        );
        return Ok(dest_path);
    }

    ensure_directory(target_dir)?;

    match fs::rename(source, &dest_path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                "Rename across devices, copying instead: {} -> {}",
                source.display(),
                dest_path.display()
            );
            copy_then_remove(source, &dest_path)?;
        }
        Err(e) => {
            return Err(OrganizeError::processing_with(
                format!(
                    "Unable to move file from {} to {}",
                    source.display(),
                    dest_path.display()
                ),
                e,
            ));
        }
    }

    info!("Moved: {} -> {}", source.display(), dest_path.display());
    Ok(dest_path)
}

/// Copy `source` to a new file at `dest_path`, then delete `source`.
/// On any failure the destination copy is removed so only the source remains.
pub(crate) fn copy_then_remove(source: &Path, dest_path: &Path) -> Result<()> {
    let opened = File::open(source).and_then(|file| {
        let permissions = file.metadata()?.permissions();
        Ok((file, permissions))
    });

    match opened {
        Ok((reader, permissions)) => copy_from_reader(reader, permissions, source, dest_path),
        Err(e) => Err(move_error(source, dest_path, e)),
    }
}

/// Body of [`copy_then_remove`] once the source is open
fn copy_from_reader<Rd: Read>(
    mut reader: Rd,
    permissions: Permissions,
    source: &Path,
    dest_path: &Path,
) -> Result<()> {
    // create_new refuses to clobber a file that appeared since the rename attempt
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest_path)
        .map_err(|e| move_error(source, dest_path, e))?;

    let copied = io::copy(&mut reader, &mut writer)
        .and_then(|_| writer.sync_all())
        .and_then(|_| fs::set_permissions(dest_path, permissions));
    drop(writer);

    if let Err(e) = copied {
        discard_partial(dest_path);
        return Err(move_error(source, dest_path, e));
    }

    if let Err(e) = fs::remove_file(source) {
        discard_partial(dest_path);
        return Err(move_error(source, dest_path, e));
    }

    Ok(())
}

fn move_error(source: &Path, dest_path: &Path, e: io::Error) -> OrganizeError {
    OrganizeError::processing_with(
        format!(
            "Unable to move file from {} to {}",
            source.display(),
            dest_path.display()
        ),
        e,
    )
}

fn discard_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(
            "Failed to remove partial copy '{}': {}",
            path.display(),
            e
        );
    }
}

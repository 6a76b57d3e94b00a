//! Gzip tarball of a capture directory.
//!
//! The archive is assembled in a temporary file next to the destination and
//! renamed into place only once the gzip stream is complete, so a failed
//! attempt never leaves a truncated `.tar.gz` behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;

/// File name of the archive written to the working directory.
pub const ARCHIVE_FILE_NAME: &str = "capture_offsets.tar.gz";

/// Directory every entry is placed under inside the archive.
pub const ENTRY_PREFIX: &str = "captures";

/// Errors that can occur while building the archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Failed to list capture directory {}: {source}", .path.display())]
    ReadSource {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to create archive next to {}: {source}", .path.display())]
    CreateTemp {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to add {} to archive: {source}", .path.display())]
    AddEntry {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to finish archive: {0}")]
    Finish(#[source] io::Error),

    #[error("Failed to move archive into place at {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        source: io::Error,
    },
}

/// What ended up in a finished archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Where the archive was written
    pub path: PathBuf,
    /// Archive entry names, in the order they were written
    pub entries: Vec<String>,
}

/// Regular files directly inside `dir`, sorted by file name.
fn capture_files(dir: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let read_error = |source| ArchiveError::ReadSource {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        if entry.file_type().map_err(read_error)?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Pack every file in `source_dir` into a gzip tarball at `destination`.
///
/// Each file is stored as `captures/<file name>`. An existing file at
/// `destination` is replaced.
pub fn write_archive(source_dir: &Path, destination: &Path) -> Result<ArchiveSummary, ArchiveError> {
    let files = capture_files(source_dir)?;

    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staging = NamedTempFile::new_in(parent).map_err(|source| ArchiveError::CreateTemp {
        path: destination.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::with_capacity(files.len());
    {
        let encoder = GzEncoder::new(staging.as_file_mut(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for file in &files {
            let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
                log::warn!("Skipping capture with non UTF-8 name: {}", file.display());
                continue;
            };
            let entry_name = format!("{}/{}", ENTRY_PREFIX, name);
            builder
                .append_path_with_name(file, &entry_name)
                .map_err(|source| ArchiveError::AddEntry {
                    path: file.clone(),
                    source,
                })?;
            log::debug!("Archived {}", entry_name);
            entries.push(entry_name);
        }

        let encoder = builder.into_inner().map_err(ArchiveError::Finish)?;
        encoder.finish().map_err(ArchiveError::Finish)?;
    }
    staging.as_file().sync_all().map_err(ArchiveError::Finish)?;

    staging
        .persist(destination)
        .map_err(|e| ArchiveError::Persist {
            path: destination.to_path_buf(),
            source: e.error,
        })?;

    log::info!(
        "Wrote {} entries to {}",
        entries.len(),
        destination.display()
    );

    Ok(ArchiveSummary {
        path: destination.to_path_buf(),
        entries,
    })
}

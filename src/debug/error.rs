//! Error types for the debug archive

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Failed to create debug directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Debug archive already exists: {0}")]
    AlreadyExists(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Failure to render a lifecycle snapshot.
///
/// Archive write failures are not reported here: hooks log them and move on.
#[derive(Error, Debug)]
pub enum HookError {
    #[error("Failed to render diff: {0}")]
    Format(#[from] serde_json::Error),
}

//! Error types for the photo organiser

use crate::config::ConfigError;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Result type alias for photo organiser operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the photo organiser
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source directory {path} does not exist")]
    SourceNotFound { path: PathBuf },

    #[error("Source directory {path} is not readable: {err}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("Directory name {name} is too short to determine date")]
    FolderCodeTooShort { name: String },

    #[error("Failed to create directory {path}: {err}")]
    CreateDir {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("Failed to move file {from} to {to}: {err}")]
    MoveFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("Failed to read EXIF data from {path}: {message}")]
    Exif { path: PathBuf, message: String },

    #[error("Failed to start {program}: {err}")]
    CommandSpawn {
        program: String,
        #[source]
        err: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    CommandFailed { program: String, status: ExitStatus },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}

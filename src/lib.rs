//! Photo Organiser - sort camera card photos into per-day directories
//!
//! This library provides:
//! - Date resolution per camera vendor (folder names, filenames, EXIF)
//! - A single-pass walker that renames files into `YYYY-MM-DD` directories
//! - Removal of vendor folders left empty by the move
//! - Mounting, rsync transfer and post-sync cleanup of the card

pub mod cleanup;
pub mod cli;
pub mod command;
pub mod config;
pub mod date;
pub mod error;
pub mod mount;
pub mod organise;
pub mod pipeline;
pub mod sync;

pub use cli::{Cli, Commands};
pub use config::{Config, ConfigError, MountConfig, RemoteConfig, Vendor};
pub use date::{CandidateFile, DateKey, DateStrategy, Resolution, SkipReason};
pub use error::{Error, Result};
pub use organise::{
    CleanupResult, CleanupStatus, FileResult, FileStatus, OrganiseOptions, OrganiseReport,
    OrganiseStats, Organiser,
};
pub use pipeline::RunReport;

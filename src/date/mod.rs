//! Date resolution module
//!
//! Each camera vendor encodes the capture date differently:
//! - Sony: in the name of the folder the file sits in
//! - DJI: in the filename
//! - Canon: in EXIF metadata, with the file modification time as fallback
//!
//! A [`DateStrategy`] is picked once per run and turns every
//! [`CandidateFile`] into either a [`DateKey`] or a skip.

pub mod exif;
pub mod filename;
pub mod folder;

use crate::config::Vendor;
use crate::error::Result;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub use self::exif::MetadataStrategy;
pub use self::filename::FilenameStrategy;
pub use self::folder::FolderNameStrategy;

static DATE_DIR_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Whether a directory name looks like an organised day bucket (`YYYY-MM-DD`)
pub fn is_date_dir_name(name: &str) -> bool {
    DATE_DIR_PATTERN
        .get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap())
        .is_match(name)
}

/// Calendar day a file is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Build a key, rejecting dates that don't exist on the calendar
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Name of the destination directory for this day
    pub fn dir_name(&self) -> String {
        self.to_string()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day()
        )
    }
}

/// A regular file found while walking the source tree
#[derive(Debug, Clone)]
pub struct CandidateFile {
    /// Absolute (root-joined) path of the file
    pub path: PathBuf,
    /// Path relative to the source root
    pub relative: PathBuf,
}

impl CandidateFile {
    pub fn new(root: &Path, path: PathBuf) -> Self {
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        Self { path, relative }
    }

    /// Raw filename
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Name of the immediate parent directory, `None` for files at the root
    pub fn parent_name(&self) -> Option<&str> {
        self.relative
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
    }

    /// Directory names between the root and the file
    pub fn dir_segments(&self) -> impl Iterator<Item = &str> {
        self.relative
            .parent()
            .into_iter()
            .flat_map(|p| p.iter())
            .filter_map(|s| s.to_str())
    }
}

/// Why a file was left where it is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Parent folder is not an 8-digit vendor folder
    NotDateFolder,
    /// Folder code does not decode to a real calendar day
    InvalidFolderDate(String),
    /// Filename does not follow the vendor pattern
    NameMismatch,
    /// File already sits in a day directory
    AlreadyOrganised,
    /// File lives under a vendor housekeeping directory
    VendorMiscDir(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotDateFolder => write!(f, "parent is not a dated folder"),
            SkipReason::InvalidFolderDate(code) => write!(f, "folder {code} is not a valid date"),
            SkipReason::NameMismatch => write!(f, "filename does not match vendor pattern"),
            SkipReason::AlreadyOrganised => write!(f, "already in a date directory"),
            SkipReason::VendorMiscDir(dir) => write!(f, "inside vendor directory {dir}"),
        }
    }
}

/// Outcome of resolving a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Date(DateKey),
    Skip(SkipReason),
}

/// Vendor-specific way of dating a file
#[derive(Debug, Clone)]
pub enum DateStrategy {
    FolderName(FolderNameStrategy),
    Filename(FilenameStrategy),
    Metadata(MetadataStrategy),
}

impl DateStrategy {
    /// Strategy for a vendor; `reference_year` is the year folder codes are decoded against
    pub fn for_vendor(vendor: Vendor, reference_year: i32) -> Self {
        match vendor {
            Vendor::Sony => DateStrategy::FolderName(FolderNameStrategy::new(reference_year)),
            Vendor::Dji => DateStrategy::Filename(FilenameStrategy),
            Vendor::Canon => DateStrategy::Metadata(MetadataStrategy::new(vendor.misc_dirs())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DateStrategy::FolderName(_) => "folder-name",
            DateStrategy::Filename(_) => "filename",
            DateStrategy::Metadata(_) => "metadata",
        }
    }

    pub fn resolve(&self, candidate: &CandidateFile) -> Result<Resolution> {
        match self {
            DateStrategy::FolderName(s) => s.resolve(candidate),
            DateStrategy::Filename(s) => Ok(s.resolve(candidate)),
            DateStrategy::Metadata(s) => s.resolve(candidate),
        }
    }

    /// Whether the walk should not descend into a directory with this name
    pub fn prunes_dir(&self, name: &str) -> bool {
        match self {
            DateStrategy::Metadata(_) => is_date_dir_name(name),
            DateStrategy::FolderName(_) | DateStrategy::Filename(_) => false,
        }
    }

    /// Whether emptied source folders are queued for removal
    pub fn tracks_source_dirs(&self) -> bool {
        matches!(self, DateStrategy::FolderName(_))
    }
}

//! Configuration types for the photo organiser

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Camera vendor, which selects the date resolution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// Dates decoded from 8-digit folder names (e.g. `10030405`)
    Sony,
    /// Dates decoded from `DJI_YYYYMMDDhhmmss_NNNN_X.ext` filenames
    Dji,
    /// Dates read from EXIF, falling back to modification time
    Canon,
}

impl Vendor {
    /// Display name used in log messages
    pub fn name(&self) -> &'static str {
        match self {
            Vendor::Sony => "Sony",
            Vendor::Dji => "DJI",
            Vendor::Canon => "Canon",
        }
    }

    /// Source directory relative to the mount point when `--source` is not given
    pub fn default_source_subdir(&self) -> PathBuf {
        match self {
            Vendor::Sony | Vendor::Canon => PathBuf::from("DCIM"),
            Vendor::Dji => ["DCIM", "DJI_001"].iter().collect(),
        }
    }

    /// Vendor housekeeping directories that never hold photos worth keeping
    pub fn misc_dirs(&self) -> &'static [&'static str] {
        match self {
            Vendor::Canon => &["CANONMSC"],
            Vendor::Sony | Vendor::Dji => &[],
        }
    }
}

/// Drive mounting settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountConfig {
    /// Block device holding the camera card
    pub device: String,

    /// Where the device gets mounted
    pub mount_point: PathBuf,

    /// Filesystem type passed to `mount -t`; `None` skips mounting entirely
    pub fs_type: Option<String>,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            device: "/dev/sdd1".into(),
            mount_point: PathBuf::from("/dev/camera"),
            fs_type: Some("exfat".into()),
        }
    }
}

/// Remote synchronisation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Remote user for rsync; `$USER` fills it in when left empty
    pub user: String,

    /// Remote host for rsync
    pub host: Option<String>,

    /// Destination path on the remote host
    pub path: Option<String>,

    /// Location of the rsync binary on the remote host
    pub rsync_path: String,

    /// Extra directory names excluded from the transfer
    pub exclude: Vec<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            host: None,
            path: None,
            rsync_path: "/bin/rsync".into(),
            exclude: vec![],
        }
    }
}

/// Configuration for a photo organiser run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the photos; derived from the mount point when unset
    pub source_dir: Option<PathBuf>,

    /// Log intended changes without touching the filesystem or the remote
    pub dry_run: bool,

    /// Verbose output
    pub verbose: bool,

    /// Answer yes to the cleanup prompt
    pub assume_yes: bool,

    pub mount: MountConfig,

    pub remote: RemoteConfig,
}

impl Config {
    /// Source directory for the given vendor
    pub fn source_for(&self, vendor: Vendor) -> PathBuf {
        self.source_dir
            .clone()
            .unwrap_or_else(|| self.mount.mount_point.join(vendor.default_source_subdir()))
    }

    /// Check the settings every run needs before anything is mounted or moved
    pub fn validate(&self) -> crate::Result<()> {
        let missing = |v: &Option<String>| v.as_deref().is_none_or(str::is_empty);
        if missing(&self.remote.host) {
            return Err(crate::Error::Config("remote host is required (--host)".into()));
        }
        if missing(&self.remote.path) {
            return Err(crate::Error::Config(
                "remote path is required (--remote-path)".into(),
            ));
        }
        if self.remote.user.is_empty() {
            return Err(crate::Error::Config("remote user is required (--user)".into()));
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# Photo Organiser Configuration File
# CLI flags override anything set here.

# Directory containing the photos.
# Defaults to <mount_point>/DCIM (or <mount_point>/DCIM/DJI_001 for DJI).
# source_dir = "/media/camera/DCIM"

# Log what would happen without moving, syncing or deleting anything
dry_run = false

# Enable debug logging
verbose = false

# Skip the cleanup confirmation prompt and clean up after a successful sync
assume_yes = false

[mount]
device = "/dev/sdd1"
mount_point = "/dev/camera"
# Set to "" to skip mounting and unmounting
fs_type = "exfat"

[remote]
user = "james"
host = "nas.local"
path = "/volume1/photos/incoming"
rsync_path = "/bin/rsync"
# Directory names left out of the transfer (vendor defaults are always added)
exclude = []
"#
        .to_string()
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

//! CLI argument parsing with clap

use crate::config::{Config, Vendor};
use clap::parser::ValueSource;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Photo Organiser - sort camera card photos into per-day directories
///
/// Mounts the card, moves every photo into a `YYYY-MM-DD` directory under
/// the source, copies the result to a remote host with rsync, optionally
/// clears the card and unmounts it.
#[derive(Parser, Debug)]
#[command(name = "photo-organiser")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file (TOML format)
    ///
    /// Settings from the file are used as defaults; CLI flags override them.
    #[arg(short = 'C', long, env = "PHOTO_ORGANISER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Device to mount
    #[arg(long, global = true)]
    pub device: Option<String>,

    /// Mount point
    #[arg(long = "directory", global = true)]
    pub mount_point: Option<PathBuf>,

    /// Filesystem type for mounting ("" skips mounting)
    #[arg(long, global = true)]
    pub mount_type: Option<String>,

    /// Source directory containing the photos (default <mount point>/DCIM)
    #[arg(short, long, global = true)]
    pub source: Option<PathBuf>,

    /// Remote user for rsync
    #[arg(long, env = "USER", global = true)]
    pub user: Option<String>,

    /// Set when `user` was taken from the environment rather than `--user`
    #[arg(skip)]
    pub user_from_env: bool,

    /// Remote host for rsync
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Remote destination path for rsync
    #[arg(long, global = true)]
    pub remote_path: Option<String>,

    /// Path of the rsync binary on the remote host
    #[arg(long, global = true)]
    pub rsync_path: Option<String>,

    /// Directory name to leave out of the transfer (repeatable)
    #[arg(long, global = true)]
    pub exclude: Vec<String>,

    /// Dry run mode - log moves, transfers and deletions without doing them
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Clean up the source after syncing without asking
    #[arg(short = 'y', long = "yes", global = true)]
    pub assume_yes: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long, global = true)]
    pub json_log: bool,

    /// Also write the log to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Organise Sony camera photos (dated folders)
    Sony,
    /// Organise DJI camera (action/drone) photos (dated filenames)
    Dji,
    /// Organise Canon camera photos (EXIF dates)
    Canon,
    /// Print version information
    Version,
}

impl Commands {
    /// Camera vendor for organising commands
    pub fn vendor(&self) -> Option<Vendor> {
        match self {
            Commands::Sony => Some(Vendor::Sony),
            Commands::Dji => Some(Vendor::Dji),
            Commands::Canon => Some(Vendor::Canon),
            Commands::Version => None,
        }
    }
}

impl Cli {
    /// Parse the process arguments, exiting with a usage message on error
    pub fn parse_args() -> Self {
        Self::try_parse_args_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    /// Parse arguments, recording where the remote user came from
    pub fn try_parse_args_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let mut cli = Self::from_arg_matches(&matches)?;
        cli.user_from_env = matches.value_source("user") == Some(ValueSource::EnvVariable);
        Ok(cli)
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref device) = self.device {
            config.mount.device = device.clone();
        }
        if let Some(ref mount_point) = self.mount_point {
            config.mount.mount_point = mount_point.clone();
        }
        if let Some(ref mount_type) = self.mount_type {
            config.mount.fs_type = Some(mount_type.clone()).filter(|t| !t.is_empty());
        }
        if let Some(ref source) = self.source {
            config.source_dir = Some(source.clone());
        }
        // $USER only fills in a user the config file left unset
        if let Some(ref user) = self.user
            && (!self.user_from_env || config.remote.user.is_empty())
        {
            config.remote.user = user.clone();
        }
        if let Some(ref host) = self.host {
            config.remote.host = Some(host.clone());
        }
        if let Some(ref remote_path) = self.remote_path {
            config.remote.path = Some(remote_path.clone());
        }
        if let Some(ref rsync_path) = self.rsync_path {
            config.remote.rsync_path = rsync_path.clone();
        }
        for dir in &self.exclude {
            if !config.remote.exclude.contains(dir) {
                config.remote.exclude.push(dir.clone());
            }
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if self.assume_yes {
            config.assume_yes = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}

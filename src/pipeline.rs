//! End-to-end run for one camera: mount, organise, sync, clean up, unmount

use crate::cleanup::{self, CleanupSummary};
use crate::config::{Config, Vendor};
use crate::date::DateStrategy;
use crate::error::Result;
use crate::mount;
use crate::organise::{OrganiseOptions, OrganiseReport, Organiser};
use crate::sync;
use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What a full run did
#[derive(Debug, Clone)]
pub struct RunReport {
    pub vendor: Vendor,
    pub source_dir: PathBuf,
    pub organise: OrganiseReport,
    /// `None` when cleanup was declined or suppressed by dry run
    pub cleanup: Option<CleanupSummary>,
}

/// Directory names kept off the remote: vendor defaults plus configured extras
pub fn sync_excludes(vendor: Vendor, config: &Config) -> Vec<String> {
    let mut excludes: Vec<String> = vendor.misc_dirs().iter().map(|d| d.to_string()).collect();
    for extra in &config.remote.exclude {
        if !excludes.contains(extra) {
            excludes.push(extra.clone());
        }
    }
    excludes
}

/// Run every stage for `vendor`
///
/// Configuration is checked before anything is mounted. Once mounted, the
/// card is unmounted even if a later stage fails; the stage error is returned.
pub fn run(vendor: Vendor, config: &Config) -> Result<RunReport> {
    config.validate()?;

    let source_dir = config.source_for(vendor);
    if config.source_dir.is_none() {
        debug!(source = %source_dir.display(), "Inferred source directory from mount point");
    }

    info!(vendor = vendor.name(), dry_run = config.dry_run, "Starting run");
    mount::mount_drive(&config.mount, config.dry_run)?;

    let outcome = run_mounted(vendor, config, &source_dir);
    let unmounted = mount::unmount_drive(&config.mount);

    match (outcome, unmounted) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(e)) | (Err(e), Ok(())) => Err(e),
        (Err(e), Err(unmount_err)) => {
            warn!(error = %unmount_err, "Failed to unmount drive after an earlier error");
            Err(e)
        }
    }
}

fn run_mounted(vendor: Vendor, config: &Config, source_dir: &Path) -> Result<RunReport> {
    let strategy = DateStrategy::for_vendor(vendor, Local::now().year());
    let organiser = Organiser::new(
        OrganiseOptions {
            source_dir: source_dir.to_path_buf(),
            dry_run: config.dry_run,
        },
        strategy,
    );
    let organise = organiser.run()?;

    sync::sync_to_remote(
        &config.remote,
        source_dir,
        config.dry_run,
        &sync_excludes(vendor, config),
    )?;

    let cleanup = cleanup::confirm_and_cleanup(source_dir, config.dry_run, config.assume_yes)?;

    Ok(RunReport {
        vendor,
        source_dir: source_dir.to_path_buf(),
        organise,
        cleanup,
    })
}

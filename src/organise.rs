//! Photo classifier and mover
//!
//! Walks the source tree once, asks the active [`DateStrategy`] for a day
//! bucket per file and renames each file into `<source>/<YYYY-MM-DD>/`.
//! Folder-name runs also remove the vendor folders they emptied.

use crate::date::{CandidateFile, DateKey, DateStrategy, Resolution, SkipReason};
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span, warn};
use walkdir::WalkDir;

/// Settings for a single organiser run
#[derive(Debug, Clone)]
pub struct OrganiseOptions {
    /// Root of the tree to organise; day directories are created directly under it
    pub source_dir: PathBuf,
    /// Log intended moves and removals without performing them
    pub dry_run: bool,
}

/// What happened to a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// File was renamed into its day directory
    Moved,
    /// Dry run - would have been moved
    DryRun,
    /// File was left in place
    Skipped(SkipReason),
}

impl FileStatus {
    /// Value of the `outcome` log field
    pub fn outcome(&self) -> &'static str {
        match self {
            FileStatus::Moved => "moved",
            FileStatus::DryRun => "dry_run",
            FileStatus::Skipped(_) => "skipped",
        }
    }
}

/// Result of processing a single file
#[derive(Debug, Clone)]
pub struct FileResult {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub date: Option<DateKey>,
    pub status: FileStatus,
}

impl FileResult {
    fn skipped(source: PathBuf, reason: SkipReason) -> Self {
        Self {
            source,
            destination: None,
            date: None,
            status: FileStatus::Skipped(reason),
        }
    }
}

/// What happened to a source folder queued for removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupStatus {
    Removed,
    /// Dry run - would have been removed if empty
    WouldRemove,
    NotEmpty,
    Failed(String),
}

impl CleanupStatus {
    /// Value of the `outcome` log field
    pub fn outcome(&self) -> &'static str {
        match self {
            CleanupStatus::Removed => "removed",
            CleanupStatus::WouldRemove => "dry_run",
            CleanupStatus::NotEmpty => "not_empty",
            CleanupStatus::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanupResult {
    pub dir: PathBuf,
    pub status: CleanupStatus,
}

/// Counters for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganiseStats {
    pub total_files: usize,
    pub moved: usize,
    pub would_move: usize,
    pub skipped: usize,
    pub dirs_removed: usize,
    pub dirs_failed: usize,
}

impl OrganiseStats {
    pub fn summary(&self) -> String {
        format!(
            "Total: {}, Moved: {}, Would move: {}, Skipped: {}, Directories removed: {}, Removal failures: {}",
            self.total_files,
            self.moved,
            self.would_move,
            self.skipped,
            self.dirs_removed,
            self.dirs_failed
        )
    }
}

/// Everything a run did, in walk order
#[derive(Debug, Clone, Default)]
pub struct OrganiseReport {
    pub files: Vec<FileResult>,
    pub cleanup: Vec<CleanupResult>,
    pub stats: OrganiseStats,
}

impl OrganiseReport {
    fn record_file(&mut self, result: FileResult) {
        self.stats.total_files += 1;
        match result.status {
            FileStatus::Moved => self.stats.moved += 1,
            FileStatus::DryRun => self.stats.would_move += 1,
            FileStatus::Skipped(_) => self.stats.skipped += 1,
        }
        self.files.push(result);
    }

    fn record_cleanup(&mut self, result: CleanupResult) {
        match result.status {
            CleanupStatus::Removed => self.stats.dirs_removed += 1,
            CleanupStatus::Failed(_) => self.stats.dirs_failed += 1,
            CleanupStatus::WouldRemove | CleanupStatus::NotEmpty => {}
        }
        self.cleanup.push(result);
    }
}

/// Sorts a source tree into day directories using one date strategy
#[derive(Debug, Clone)]
pub struct Organiser {
    options: OrganiseOptions,
    strategy: DateStrategy,
}

impl Organiser {
    pub fn new(options: OrganiseOptions, strategy: DateStrategy) -> Self {
        Self { options, strategy }
    }

    pub fn source_dir(&self) -> &Path {
        &self.options.source_dir
    }

    /// Run the walk, the moves and (for folder-name runs) the empty-folder cleanup
    ///
    /// The first failed move aborts the run; folders queued for cleanup are
    /// then left alone.
    pub fn run(&self) -> Result<OrganiseReport> {
        let _span = span!(Level::INFO, "organise", strategy = self.strategy.name()).entered();
        let root = &self.options.source_dir;
        let dry_run = self.options.dry_run;

        self.check_source()?;
        info!(source = %root.display(), dry_run, "Starting photo organisation");

        let mut report = OrganiseReport::default();
        let pending_cleanup = self.walk(&mut report)?;
        if self.strategy.tracks_source_dirs() {
            self.remove_emptied_dirs(pending_cleanup, &mut report);
        }

        info!("{}", report.stats.summary());
        Ok(report)
    }

    /// Process every regular file under the root, returning the folders that
    /// were emptied of dated files
    fn walk(&self, report: &mut OrganiseReport) -> Result<BTreeSet<PathBuf>> {
        let root = &self.options.source_dir;
        let mut pending_cleanup = BTreeSet::new();

        // Sorting makes walkdir read each directory listing in full before
        // yielding from it, so day directories created mid-walk are not revisited.
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !e
                        .file_name()
                        .to_str()
                        .is_some_and(|name| self.strategy.prunes_dir(name))
            });

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let candidate = CandidateFile::new(root, entry.into_path());
            let result = self.process_file(candidate, &mut pending_cleanup)?;
            report.record_file(result);
        }

        Ok(pending_cleanup)
    }

    /// Removal failures are recorded and logged, never returned
    fn remove_emptied_dirs(&self, pending_cleanup: BTreeSet<PathBuf>, report: &mut OrganiseReport) {
        debug!(count = pending_cleanup.len(), "Checking for empty directories to remove");
        for dir in pending_cleanup {
            let result = self.remove_if_empty(dir);
            report.record_cleanup(result);
        }
    }

    fn check_source(&self) -> Result<()> {
        let root = &self.options.source_dir;
        let metadata = fs::metadata(root).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::SourceNotFound {
                path: root.clone(),
            },
            _ => Error::SourceUnreadable {
                path: root.clone(),
                err,
            },
        })?;

        if !metadata.is_dir() {
            return Err(Error::SourceUnreadable {
                path: root.clone(),
                err: io::Error::other("not a directory"),
            });
        }

        fs::read_dir(root).map_err(|err| Error::SourceUnreadable {
            path: root.clone(),
            err,
        })?;
        Ok(())
    }

    fn process_file(
        &self,
        candidate: CandidateFile,
        pending_cleanup: &mut BTreeSet<PathBuf>,
    ) -> Result<FileResult> {
        let date = match self.strategy.resolve(&candidate)? {
            Resolution::Date(date) => date,
            Resolution::Skip(reason) => {
                debug!(
                    source = %candidate.path.display(),
                    dry_run = self.options.dry_run,
                    outcome = "skipped",
                    %reason,
                    "Skipping file"
                );
                return Ok(FileResult::skipped(candidate.path, reason));
            }
        };

        let file_name = candidate.path.file_name().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", candidate.path.display()),
            ))
        })?;
        let dest_dir = self.options.source_dir.join(date.dir_name());
        let destination = dest_dir.join(file_name);

        if destination == candidate.path {
            let result = FileResult::skipped(candidate.path, SkipReason::AlreadyOrganised);
            debug!(
                source = %result.source.display(),
                dry_run = self.options.dry_run,
                outcome = result.status.outcome(),
                "File already in its date directory"
            );
            return Ok(result);
        }

        if self.strategy.tracks_source_dirs()
            && let Some(parent) = candidate.path.parent()
        {
            pending_cleanup.insert(parent.to_path_buf());
        }

        let dry_run = self.options.dry_run;
        debug!(
            source = %candidate.path.display(),
            destination = %destination.display(),
            dry_run,
            "Processing file"
        );

        if dry_run {
            info!(
                source = %candidate.path.display(),
                destination = %destination.display(),
                dry_run,
                outcome = FileStatus::DryRun.outcome(),
                "Would move file"
            );
            return Ok(FileResult {
                source: candidate.path,
                destination: Some(destination),
                date: Some(date),
                status: FileStatus::DryRun,
            });
        }

        if let Err(err) = fs::create_dir_all(&dest_dir) {
            error!(
                source = %candidate.path.display(),
                destination = %destination.display(),
                dry_run,
                outcome = "failed",
                error = %err,
                "Failed to create date directory"
            );
            return Err(Error::CreateDir {
                path: dest_dir,
                err,
            });
        }
        if let Err(err) = fs::rename(&candidate.path, &destination) {
            error!(
                source = %candidate.path.display(),
                destination = %destination.display(),
                dry_run,
                outcome = "failed",
                error = %err,
                "Failed to move file"
            );
            return Err(Error::MoveFile {
                from: candidate.path,
                to: destination,
                err,
            });
        }

        info!(
            source = %candidate.path.display(),
            destination = %destination.display(),
            dry_run,
            outcome = FileStatus::Moved.outcome(),
            "Moved file"
        );

        Ok(FileResult {
            source: candidate.path,
            destination: Some(destination),
            date: Some(date),
            status: FileStatus::Moved,
        })
    }

    /// Remove a source folder if nothing is left in it; failures are only logged
    fn remove_if_empty(&self, dir: PathBuf) -> CleanupResult {
        let dry_run = self.options.dry_run;
        if dry_run {
            let status = CleanupStatus::WouldRemove;
            info!(dir = %dir.display(), dry_run, outcome = status.outcome(), "Would remove directory if empty");
            return CleanupResult { dir, status };
        }

        let status = match fs::read_dir(&dir).map(|mut entries| entries.next().is_none()) {
            Ok(true) => match fs::remove_dir(&dir) {
                Ok(()) => {
                    let status = CleanupStatus::Removed;
                    info!(dir = %dir.display(), dry_run, outcome = status.outcome(), "Removed empty directory");
                    status
                }
                Err(e) => {
                    let status = CleanupStatus::Failed(e.to_string());
                    warn!(dir = %dir.display(), error = %e, dry_run, outcome = status.outcome(), "Failed to remove directory");
                    status
                }
            },
            Ok(false) => {
                let status = CleanupStatus::NotEmpty;
                debug!(dir = %dir.display(), dry_run, outcome = status.outcome(), "Directory not empty, keeping it");
                status
            }
            Err(e) => {
                let status = CleanupStatus::Failed(e.to_string());
                warn!(dir = %dir.display(), error = %e, dry_run, outcome = status.outcome(), "Failed to read directory");
                status
            }
        };

        CleanupResult { dir, status }
    }
}

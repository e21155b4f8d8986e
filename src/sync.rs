//! Copying the organised tree to the remote host with rsync

use crate::command::run_command;
use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use std::path::{MAIN_SEPARATOR, Path};
use tracing::info;

/// Source path with a trailing separator so rsync copies the contents, not the directory
pub fn rsync_source(source: &Path) -> String {
    let mut source = source.display().to_string();
    if !source.ends_with(MAIN_SEPARATOR) {
        source.push(MAIN_SEPARATOR);
    }
    source
}

/// Build the rsync argument list
///
/// Files already on the remote are never overwritten. In dry-run mode rsync
/// only lists what it would transfer.
pub fn rsync_args(
    remote: &RemoteConfig,
    source: &Path,
    dry_run: bool,
    excludes: &[String],
) -> Result<Vec<String>> {
    let host = remote
        .host
        .as_deref()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::Config("remote host is required for rsync".into()))?;
    let path = remote
        .path
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::Config("remote path is required for rsync".into()))?;

    let short_flags = if dry_run { "-avhPn" } else { "-avhP" };
    let mut args = vec![
        short_flags.to_string(),
        format!("--rsync-path={}", remote.rsync_path),
        "--ignore-existing".to_string(),
    ];
    args.extend(excludes.iter().map(|dir| format!("--exclude={dir}")));
    args.push(rsync_source(source));
    args.push(format!("{}@{}:{}", remote.user, host, path));
    Ok(args)
}

/// Sync `source` to the configured remote
pub fn sync_to_remote(
    remote: &RemoteConfig,
    source: &Path,
    dry_run: bool,
    excludes: &[String],
) -> Result<()> {
    let args = rsync_args(remote, source, dry_run, excludes)?;
    info!(?args, dry_run, "Starting rsync to remote destination");
    run_command("rsync", &args)?;
    info!("rsync completed successfully");
    Ok(())
}

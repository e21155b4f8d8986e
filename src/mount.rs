//! Mounting and unmounting the camera card
//!
//! Both steps are skipped when no filesystem type is configured, which lets
//! the organiser run against an already-mounted card or a plain directory.

use crate::command::run_command;
use crate::config::MountConfig;
use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Arguments for `sudo` to mount the card readable and writable by the current user
pub fn mount_args(mount: &MountConfig, fs_type: &str, uid: u32, gid: u32) -> Vec<String> {
    vec![
        "mount".into(),
        "-t".into(),
        fs_type.into(),
        mount.device.clone(),
        mount.mount_point.display().to_string(),
        "-o".into(),
        format!("uid={uid},gid={gid},metadata"),
    ]
}

/// Arguments for `sudo` to unmount the card
pub fn unmount_args(mount: &MountConfig) -> Vec<String> {
    vec!["umount".into(), mount.mount_point.display().to_string()]
}

/// Filesystem type to mount with, if mounting is enabled
fn fs_type(mount: &MountConfig) -> Option<&str> {
    mount.fs_type.as_deref().filter(|t| !t.is_empty())
}

#[cfg(unix)]
fn current_ids() -> Result<(u32, u32)> {
    Ok((
        nix::unistd::getuid().as_raw(),
        nix::unistd::getgid().as_raw(),
    ))
}

#[cfg(not(unix))]
fn current_ids() -> Result<(u32, u32)> {
    Err(Error::Config(
        "mounting is only supported on Unix; set the filesystem type to \"\"".into(),
    ))
}

/// Create the mount point, retrying through sudo when we lack permission
fn ensure_mount_point(path: &Path, dry_run: bool) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if dry_run {
        info!(mount_point = %path.display(), dry_run, "Would create mount point");
        return Ok(());
    }

    match fs::create_dir_all(path) {
        Ok(()) => {
            info!(mount_point = %path.display(), "Created mount point directory");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            warn!(
                mount_point = %path.display(),
                error = %e,
                "Failed to create mount point directory, retrying with sudo"
            );
            run_command(
                "sudo",
                &["mkdir".into(), "-p".into(), path.display().to_string()],
            )?;
            info!(mount_point = %path.display(), "Created mount point directory with sudo");
            Ok(())
        }
        Err(err) => Err(Error::CreateDir {
            path: path.to_path_buf(),
            err,
        }),
    }
}

/// Mount the card; the mount point is only created outside dry runs
pub fn mount_drive(mount: &MountConfig, dry_run: bool) -> Result<()> {
    let Some(fs_type) = fs_type(mount) else {
        info!("Skipping mount step (filesystem type is empty)");
        return Ok(());
    };

    ensure_mount_point(&mount.mount_point, dry_run)?;

    let (uid, gid) = current_ids()?;
    info!(
        drive = %mount.device,
        mount_point = %mount.mount_point.display(),
        fs_type,
        "Mounting drive"
    );
    run_command("sudo", &mount_args(mount, fs_type, uid, gid))?;
    info!("Drive mounted successfully");
    Ok(())
}

/// Unmount the card if mounting is enabled
pub fn unmount_drive(mount: &MountConfig) -> Result<()> {
    if fs_type(mount).is_none() {
        info!("Skipping unmount step (filesystem type is empty)");
        return Ok(());
    }

    info!(mount_point = %mount.mount_point.display(), "Unmounting drive");
    run_command("sudo", &unmount_args(mount))?;
    info!("Drive unmounted successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn card() -> MountConfig {
        MountConfig {
            device: "/dev/sdb1".into(),
            mount_point: PathBuf::from("/mnt/camera"),
            fs_type: Some("exfat".into()),
        }
    }

    #[test]
    fn test_mount_args() {
        assert_eq!(
            mount_args(&card(), "exfat", 1000, 100),
            vec![
                "mount",
                "-t",
                "exfat",
                "/dev/sdb1",
                "/mnt/camera",
                "-o",
                "uid=1000,gid=100,metadata"
            ]
        );
        assert_eq!(unmount_args(&card()), vec!["umount", "/mnt/camera"]);
    }

    #[test]
    fn test_empty_fs_type_skips_mounting() {
        let mut mount = card();
        mount.fs_type = Some(String::new());
        assert!(mount_drive(&mount, false).is_ok());
        assert!(unmount_drive(&mount).is_ok());

        mount.fs_type = None;
        assert!(mount_drive(&mount, false).is_ok());
        assert!(unmount_drive(&mount).is_ok());
    }

    #[test]
    fn test_dry_run_does_not_create_mount_point() {
        let dir = tempfile::TempDir::new().unwrap();
        let mount_point = dir.path().join("camera");

        ensure_mount_point(&mount_point, true).unwrap();
        assert!(!mount_point.exists());

        ensure_mount_point(&mount_point, false).unwrap();
        assert!(mount_point.is_dir());
    }
}

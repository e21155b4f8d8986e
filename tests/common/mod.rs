//! Shared fixtures for the integration tests

#![allow(dead_code)]

use chrono::{Local, TimeZone};
use filetime::FileTime;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// A temporary card directory with helpers to populate and inspect it
pub struct CardFixture {
    temp_dir: TempDir,
}

impl CardFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        CardFixture { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a file (and its parent directories) relative to the root
    pub fn create_file(&self, rel_path: &str, content: &[u8]) -> PathBuf {
        let path = self.path().join(rel_path);
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent directory");
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn create_dir(&self, rel_path: &str) {
        fs::create_dir_all(self.path().join(rel_path)).expect("Failed to create directory");
    }

    /// Set a file's modification time to noon local time on the given day
    pub fn set_mtime(&self, rel_path: &str, year: i32, month: u32, day: u32) {
        let local = Local
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .unwrap();
        filetime::set_file_mtime(
            self.path().join(rel_path),
            FileTime::from_unix_time(local.timestamp(), 0),
        )
        .expect("Failed to set mtime");
    }

    pub fn assert_file(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(path.is_file(), "File should exist: {}", path.display());
    }

    pub fn assert_missing(&self, rel_path: &str) {
        let path = self.path().join(rel_path);
        assert!(!path.exists(), "Path should not exist: {}", path.display());
    }

    /// Every path under the root with file contents (`None` for directories)
    pub fn snapshot(&self) -> BTreeMap<PathBuf, Option<Vec<u8>>> {
        WalkDir::new(self.path())
            .min_depth(1)
            .into_iter()
            .map(|e| e.unwrap())
            .map(|e| {
                let rel = e.path().strip_prefix(self.path()).unwrap().to_path_buf();
                let content = e
                    .file_type()
                    .is_file()
                    .then(|| fs::read(e.path()).unwrap());
                (rel, content)
            })
            .collect()
    }
}

/// Minimal JPEG whose EXIF block carries DateTimeOriginal = `timestamp`
/// (`YYYY:MM:DD HH:MM:SS`)
pub fn jpeg_with_capture_date(timestamp: &str) -> Vec<u8> {
    assert_eq!(timestamp.len(), 19);
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II*\0");
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x8769u16.to_le_bytes());
    tiff.extend_from_slice(&4u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&26u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x9003u16.to_le_bytes());
    tiff.extend_from_slice(&2u16.to_le_bytes());
    tiff.extend_from_slice(&20u32.to_le_bytes());
    tiff.extend_from_slice(&44u32.to_le_bytes());
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(timestamp.as_bytes());
    tiff.push(0);

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    jpeg.extend_from_slice(&app1);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

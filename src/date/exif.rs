//! EXIF dating for Canon cameras, with modification time as fallback

use super::{CandidateFile, DateKey, Resolution, SkipReason, is_date_dir_name};
use crate::error::{Error, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, trace};

/// EXIF tags to try for date extraction, in priority order
const DATE_TAGS: &[Tag] = &[
    Tag::DateTimeOriginal,  // When the original image was taken
    Tag::DateTimeDigitized, // When the image was digitized
    Tag::DateTime,          // File modification date/time
];

/// Read the capture time embedded in a file's EXIF block
pub fn read_capture_date(path: &Path) -> Result<NaiveDateTime> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let exif = Reader::new()
        .read_from_container(&mut reader)
        .map_err(|e| Error::Exif {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    for tag in DATE_TAGS {
        if let Some(field) = exif.get_field(*tag, In::PRIMARY)
            && let Some(datetime) = ascii_datetime(&field.value)
        {
            trace!(?path, ?tag, "Found EXIF date");
            return Ok(datetime);
        }
    }

    Err(Error::Exif {
        path: path.to_path_buf(),
        message: "No valid date tag found in EXIF data".to_string(),
    })
}

/// Convert an EXIF ASCII value ("YYYY:MM:DD HH:MM:SS") to a naive timestamp
fn ascii_datetime(value: &Value) -> Option<NaiveDateTime> {
    let Value::Ascii(parts) = value else {
        return None;
    };
    let dt = exif::DateTime::from_ascii(parts.first()?).ok()?;
    NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())?.and_hms_opt(
        dt.hour.into(),
        dt.minute.into(),
        dt.second.into(),
    )
}

/// Last-modified time of a file, in local time
pub fn modified_date(path: &Path) -> Result<NaiveDateTime> {
    let modified = fs::metadata(path)?.modified()?;
    let local: DateTime<Local> = modified.into();
    Ok(local.naive_local())
}

/// Dates files from EXIF metadata, falling back to modification time
#[derive(Debug, Clone)]
pub struct MetadataStrategy {
    misc_dirs: Vec<String>,
}

impl MetadataStrategy {
    /// `misc_dirs` are vendor directory names whose contents are never moved
    pub fn new(misc_dirs: &[&str]) -> Self {
        Self {
            misc_dirs: misc_dirs.iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn resolve(&self, candidate: &CandidateFile) -> Result<Resolution> {
        if candidate.parent_name().is_some_and(is_date_dir_name) {
            debug!(file = %candidate.path.display(), "Skipping file already in date folder");
            return Ok(Resolution::Skip(SkipReason::AlreadyOrganised));
        }

        if let Some(dir) = candidate
            .dir_segments()
            .find(|seg| self.misc_dirs.iter().any(|m| m.eq_ignore_ascii_case(seg)))
        {
            debug!(file = %candidate.path.display(), dir, "Skipping file in vendor directory");
            return Ok(Resolution::Skip(SkipReason::VendorMiscDir(dir.to_string())));
        }

        let taken = match read_capture_date(&candidate.path) {
            Ok(taken) => taken,
            Err(e) => {
                debug!(file = %candidate.path.display(), error = %e, "No EXIF date, using modification time");
                modified_date(&candidate.path)?
            }
        };

        Ok(Resolution::Date(DateKey::from(taken.date())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use filetime::FileTime;
    use tempfile::TempDir;

    /// Minimal JPEG: SOI, an APP1 segment holding a TIFF block whose Exif IFD
    /// carries DateTimeOriginal, then EOI
    fn jpeg_with_capture_date(timestamp: &str) -> Vec<u8> {
        assert_eq!(timestamp.len(), 19);
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II*\0");
        tiff.extend_from_slice(&8u32.to_le_bytes());
        // IFD0 at 8: ExifIFDPointer -> 26
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x8769u16.to_le_bytes());
        tiff.extend_from_slice(&4u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&26u32.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes());
        // Exif IFD at 26: DateTimeOriginal, 20 ASCII bytes at 44
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

    fn set_mtime(path: &Path, year: i32, month: u32, day: u32) {
        let local = Local
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .unwrap();
        filetime::set_file_mtime(path, FileTime::from_unix_time(local.timestamp(), 0)).unwrap();
    }

    #[test]
    fn test_read_capture_date() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("IMG_0001.JPG");
        fs::write(&path, jpeg_with_capture_date("2022:11:02 10:00:00")).unwrap();

        let taken = read_capture_date(&path).unwrap();
        assert_eq!(taken.to_string(), "2022-11-02 10:00:00");
    }

    #[test]
    fn test_read_capture_date_without_exif() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, b"not an image").unwrap();
        assert!(matches!(read_capture_date(&path), Err(Error::Exif { .. })));
    }

    #[test]
    fn test_exif_wins_over_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("100CANON").join("IMG_0001.JPG");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, jpeg_with_capture_date("2022:11:02 10:00:00")).unwrap();
        set_mtime(&path, 2019, 5, 5);

        let strategy = MetadataStrategy::new(&["CANONMSC"]);
        let candidate = CandidateFile::new(dir.path(), path);
        assert_eq!(
            strategy.resolve(&candidate).unwrap(),
            Resolution::Date(DateKey::from_ymd(2022, 11, 2).unwrap())
        );
    }

    #[test]
    fn test_falls_back_to_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("100CANON").join("MVI_0002.MOV");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"no metadata here").unwrap();
        set_mtime(&path, 2022, 1, 1);

        let strategy = MetadataStrategy::new(&["CANONMSC"]);
        let candidate = CandidateFile::new(dir.path(), path);
        assert_eq!(
            strategy.resolve(&candidate).unwrap(),
            Resolution::Date(DateKey::from_ymd(2022, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_skips_vendor_and_date_dirs() {
        let root = Path::new("/card/DCIM");
        let strategy = MetadataStrategy::new(&["CANONMSC"]);

        let misc = CandidateFile::new(root, root.join("canonmsc/M0100.CTG"));
        assert_eq!(
            strategy.resolve(&misc).unwrap(),
            Resolution::Skip(SkipReason::VendorMiscDir("canonmsc".into()))
        );

        let done = CandidateFile::new(root, root.join("2022-11-02/IMG_0001.JPG"));
        assert_eq!(
            strategy.resolve(&done).unwrap(),
            Resolution::Skip(SkipReason::AlreadyOrganised)
        );
    }
}

//! Filename dating for DJI action and drone cameras

use super::{CandidateFile, DateKey, Resolution, SkipReason};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// Pattern: DJI_YYYYMMDDhhmmss_NNNN_X.ext
static DJI_PATTERN: OnceLock<Regex> = OnceLock::new();

fn dji_pattern() -> &'static Regex {
    DJI_PATTERN.get_or_init(|| {
        Regex::new(r"^DJI_(\d{4})(\d{2})(\d{2})\d{6}_\d+_\w\..+$").unwrap()
    })
}

/// Parse the capture date out of a DJI filename
pub fn parse_dji_filename(filename: &str) -> Option<DateKey> {
    let caps = dji_pattern().captures(filename)?;
    let year = caps.get(1)?.as_str().parse().ok()?;
    let month = caps.get(2)?.as_str().parse().ok()?;
    let day = caps.get(3)?.as_str().parse().ok()?;
    DateKey::from_ymd(year, month, day)
}

/// Dates files by the timestamp embedded in their name
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameStrategy;

impl FilenameStrategy {
    pub fn resolve(&self, candidate: &CandidateFile) -> Resolution {
        let Some(name) = candidate.file_name() else {
            return Resolution::Skip(SkipReason::NameMismatch);
        };

        match parse_dji_filename(name) {
            Some(key) => {
                trace!(filename = name, date = %key, "Matched DJI pattern");
                Resolution::Date(key)
            }
            None => {
                debug!(file = name, "Skipping non-DJI file");
                Resolution::Skip(SkipReason::NameMismatch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_dji_format() {
        let key = parse_dji_filename("DJI_20230615123045_0001_D.JPG").unwrap();
        assert_eq!(key.to_string(), "2023-06-15");

        let key = parse_dji_filename("DJI_20241231235959_0123_W.MP4").unwrap();
        assert_eq!(key.to_string(), "2024-12-31");
    }

    #[test]
    fn test_non_dji_names() {
        assert!(parse_dji_filename("IMG_0001.JPG").is_none());
        assert!(parse_dji_filename("DJI_0001.JPG").is_none());
        assert!(parse_dji_filename("DJI_20230615123045_0001_D").is_none());
        assert!(parse_dji_filename("xDJI_20230615123045_0001_D.JPG").is_none());
    }

    #[test]
    fn test_impossible_date_is_rejected() {
        assert!(parse_dji_filename("DJI_20231315123045_0001_D.JPG").is_none());
        assert!(parse_dji_filename("DJI_20230231123045_0001_D.JPG").is_none());
    }

    #[test]
    fn test_resolve_ignores_directory() {
        let root = Path::new("/card/DCIM/DJI_001");
        let nested = CandidateFile::new(root, root.join("misc/DJI_20230615123045_0001_D.JPG"));
        assert_eq!(
            FilenameStrategy.resolve(&nested),
            Resolution::Date(DateKey::from_ymd(2023, 6, 15).unwrap())
        );

        let other = CandidateFile::new(root, root.join("IMG_0001.JPG"));
        assert_eq!(
            FilenameStrategy.resolve(&other),
            Resolution::Skip(SkipReason::NameMismatch)
        );
    }
}

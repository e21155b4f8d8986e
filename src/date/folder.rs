//! Folder-name dating for Sony cameras
//!
//! Sony cards store photos in folders like `10030405`: a three digit folder
//! number, the last digit of the year, then month and day. Only the units
//! digit of the year survives, so the decade is borrowed from a reference
//! year (normally the current one). Photos taken in an earlier decade come
//! out with the wrong year; the vendor tool behaves the same way.

use super::{CandidateFile, DateKey, Resolution, SkipReason};
use crate::error::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{trace, warn};

static FOLDER_CODE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn folder_code_pattern() -> &'static Regex {
    FOLDER_CODE_PATTERN.get_or_init(|| Regex::new(r"^\d{8}$").unwrap())
}

/// Whether a directory name is a Sony dated folder
pub fn is_folder_code(name: &str) -> bool {
    folder_code_pattern().is_match(name)
}

/// Decode a folder code against `reference_year`
///
/// Returns `Ok(None)` when month or day don't form a real date.
pub fn decode_folder_code(name: &str, reference_year: i32) -> Result<Option<DateKey>> {
    let field = |range: std::ops::Range<usize>| name.get(range);
    if name.len() < 8 {
        return Err(Error::FolderCodeTooShort {
            name: name.to_string(),
        });
    }

    let (Some(year_digit), Some(month), Some(day)) = (field(3..4), field(4..6), field(6..8))
    else {
        return Ok(None);
    };

    let reference = reference_year.to_string();
    let decade = &reference[..reference.len() - 1];
    let year = format!("{decade}{year_digit}");

    let parsed = (year.parse::<i32>(), month.parse::<u32>(), day.parse::<u32>());
    let (Ok(year), Ok(month), Ok(day)) = parsed else {
        return Ok(None);
    };

    Ok(DateKey::from_ymd(year, month, day))
}

/// Dates files by the 8-digit folder they sit in
#[derive(Debug, Clone)]
pub struct FolderNameStrategy {
    reference_year: i32,
}

impl FolderNameStrategy {
    pub fn new(reference_year: i32) -> Self {
        Self { reference_year }
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    pub fn resolve(&self, candidate: &CandidateFile) -> Result<Resolution> {
        let Some(parent) = candidate.parent_name().filter(|p| is_folder_code(p)) else {
            return Ok(Resolution::Skip(SkipReason::NotDateFolder));
        };

        match decode_folder_code(parent, self.reference_year)? {
            Some(key) => {
                trace!(folder = parent, date = %key, "Decoded folder code");
                Ok(Resolution::Date(key))
            }
            None => {
                warn!(
                    folder = parent,
                    file = %candidate.path.display(),
                    "Folder code is not a valid date, leaving file in place"
                );
                Ok(Resolution::Skip(SkipReason::InvalidFolderDate(
                    parent.to_string(),
                )))
            }
        }
    }
}

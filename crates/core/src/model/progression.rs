use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Months per quarter in the program calendar.
pub const MONTHS_PER_QUARTER: u8 = 3;
/// Quarters per program year.
pub const QUARTERS_PER_YEAR: u8 = 4;
/// Length of the full program in progression units (two years).
pub const PROGRAM_UNITS: u32 = 24;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressionError {
    #[error("year must be at least 1, got {0}")]
    InvalidYear(u16),

    #[error("quarter must be in 1..=4, got {0}")]
    InvalidQuarter(u8),

    #[error("month must be in 1..=3, got {0}")]
    InvalidMonth(u8),

    #[error("unknown track: {0}")]
    UnknownTrack(String),
}

//
// ─── TRACK ────────────────────────────────────────────────────────────────────
//

/// Learning-style variant that selects the question and content pool.
///
/// Tracks never change how answers are scored or how the calendar advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Track {
    Visual,
    Auditory,
    Kinesthetic,
    ReadingWriting,
}

impl Track {
    pub const ALL: [Track; 4] = [
        Track::Visual,
        Track::Auditory,
        Track::Kinesthetic,
        Track::ReadingWriting,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Track::Visual => "visual",
            Track::Auditory => "auditory",
            Track::Kinesthetic => "kinesthetic",
            Track::ReadingWriting => "reading-writing",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Track {
    type Err = ProgressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Track::ALL
            .into_iter()
            .find(|track| track.as_str() == s.trim())
            .ok_or_else(|| ProgressionError::UnknownTrack(s.to_owned()))
    }
}

//
// ─── PROGRESSION STATE ────────────────────────────────────────────────────────
//

/// Position of a user within the two-year program calendar.
///
/// `quarter` is within the year and `month` is within the quarter, so the
/// first unit is `(1, 1, 1)` and the last is `(2, 4, 3)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    year: u16,
    quarter: u8,
    month: u8,
    completed: bool,
    track: Track,
}

impl ProgressionState {
    /// Validate and build a state.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError` if any calendar component is out of range.
    pub fn new(
        track: Track,
        year: u16,
        quarter: u8,
        month: u8,
        completed: bool,
    ) -> Result<Self, ProgressionError> {
        if year == 0 {
            return Err(ProgressionError::InvalidYear(year));
        }
        if !(1..=QUARTERS_PER_YEAR).contains(&quarter) {
            return Err(ProgressionError::InvalidQuarter(quarter));
        }
        if !(1..=MONTHS_PER_QUARTER).contains(&month) {
            return Err(ProgressionError::InvalidMonth(month));
        }
        Ok(Self {
            year,
            quarter,
            month,
            completed,
            track,
        })
    }

    /// The first unit of a fresh program.
    #[must_use]
    pub fn start(track: Track) -> Self {
        Self {
            year: 1,
            quarter: 1,
            month: 1,
            completed: false,
            track,
        }
    }

    #[must_use]
    pub fn year(&self) -> u16 {
        self.year
    }

    #[must_use]
    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    #[must_use]
    pub fn month(&self) -> u8 {
        self.month
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn track(&self) -> Track {
        self.track
    }

    /// Month within the year (1..=12).
    #[must_use]
    pub fn month_of_year(&self) -> u8 {
        (self.quarter - 1) * MONTHS_PER_QUARTER + self.month
    }

    /// Flattened progression unit, starting at 1 for `(1, 1, 1)`.
    #[must_use]
    pub fn unit(&self) -> u32 {
        unit_of(self.year, self.quarter, self.month)
    }

    pub(crate) fn with_calendar(self, year: u16, quarter: u8, month: u8) -> Self {
        Self {
            year,
            quarter,
            month,
            ..self
        }
    }

    pub(crate) fn mark_completed(self) -> Self {
        Self {
            completed: true,
            ..self
        }
    }
}

pub(crate) fn unit_of(year: u16, quarter: u8, month: u8) -> u32 {
    (u32::from(year) - 1) * u32::from(QUARTERS_PER_YEAR) * u32::from(MONTHS_PER_QUARTER)
        + (u32::from(quarter) - 1) * u32::from(MONTHS_PER_QUARTER)
        + u32::from(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_out_of_range_components() {
        assert_eq!(
            ProgressionState::new(Track::Visual, 0, 1, 1, false).unwrap_err(),
            ProgressionError::InvalidYear(0)
        );
        assert_eq!(
            ProgressionState::new(Track::Visual, 1, 5, 1, false).unwrap_err(),
            ProgressionError::InvalidQuarter(5)
        );
        assert_eq!(
            ProgressionState::new(Track::Visual, 1, 1, 4, false).unwrap_err(),
            ProgressionError::InvalidMonth(4)
        );
    }

    #[test]
    fn unit_flattens_calendar() {
        let first = ProgressionState::start(Track::Auditory);
        assert_eq!(first.unit(), 1);

        let last = ProgressionState::new(Track::Auditory, 2, 4, 3, false).unwrap();
        assert_eq!(last.unit(), PROGRAM_UNITS);
        assert_eq!(last.month_of_year(), 12);
    }

    #[test]
    fn track_parses_its_display_form() {
        for track in Track::ALL {
            assert_eq!(track.to_string().parse::<Track>().unwrap(), track);
        }
        assert!(matches!(
            "tactile".parse::<Track>(),
            Err(ProgressionError::UnknownTrack(_))
        ));
    }

    #[test]
    fn track_serializes_kebab_case() {
        let json = serde_json::to_string(&Track::ReadingWriting).unwrap();
        assert_eq!(json, "\"reading-writing\"");
    }
}

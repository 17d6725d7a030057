//! Calendar advancement after a gate attempt.

use serde::{Deserialize, Serialize};

use crate::model::{MONTHS_PER_QUARTER, PROGRAM_UNITS, ProgressionState, QUARTERS_PER_YEAR, unit_of};

/// Result of running the advancer on a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advance {
    pub next: ProgressionState,
    pub just_completed: bool,
}

/// Move `state` forward one unit when `passed`, detecting program completion.
///
/// Completion is decided before the candidate state is returned, so a state
/// at the final unit never advances into a unit past the program; it comes
/// back unchanged apart from its `completed` flag.
#[must_use]
pub fn advance(state: &ProgressionState, passed: bool) -> Advance {
    if !passed || state.completed() {
        return Advance {
            next: *state,
            just_completed: false,
        };
    }

    let mut year = state.year();
    let mut quarter = state.quarter();
    let mut month = state.month() + 1;
    if month > MONTHS_PER_QUARTER {
        month = 1;
        quarter += 1;
    }
    if quarter > QUARTERS_PER_YEAR {
        quarter = 1;
        year = year.saturating_add(1);
    }

    if unit_of(year, quarter, month) > PROGRAM_UNITS {
        return Advance {
            next: state.mark_completed(),
            just_completed: true,
        };
    }

    Advance {
        next: state.with_calendar(year, quarter, month),
        just_completed: false,
    }
}

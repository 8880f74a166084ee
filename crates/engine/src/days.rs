//! Day Allocator (SPEC_FULL.md §4.4).

use std::collections::HashSet;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use examcal_domain::ApplicationWindow;
use examcal_storage::WindowRepository;

use crate::error::EngineError;
use crate::window::extend_if_needed;

const EXTENSION_STEP_DAYS: u64 = 7;
const MAX_EXTENSIONS: usize = 20;

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// All eligible (weekday, non-holiday) dates within `[max(start, window.first_date),
/// window.last_date]`, in ascending order.
pub fn eligible_dates(
    window: &ApplicationWindow,
    start: NaiveDate,
    holidays: &HashSet<NaiveDate>,
) -> Vec<NaiveDate> {
    let mut cursor = start.max(window.first_date);
    if cursor > window.last_date {
        cursor = window.first_date;
    }

    let mut dates = Vec::new();
    while cursor <= window.last_date {
        if is_weekday(cursor) && !holidays.contains(&cursor) {
            dates.push(cursor);
        }
        cursor = cursor.checked_add_days(Days::new(1)).expect("date overflow");
    }
    dates
}

/// Like [`eligible_dates`], but grows `window.last_date` (persisting the change) until at
/// least `min_count` dates are available or the extension budget is exhausted.
pub async fn ensure_eligible_dates(
    repo: &WindowRepository,
    window: &mut ApplicationWindow,
    start: NaiveDate,
    holidays: &HashSet<NaiveDate>,
    min_count: usize,
) -> Result<Vec<NaiveDate>, EngineError> {
    for _ in 0..=MAX_EXTENSIONS {
        let dates = eligible_dates(window, start, holidays);
        if dates.len() >= min_count {
            return Ok(dates);
        }
        let extended_last = window.last_date + Days::new(EXTENSION_STEP_DAYS);
        extend_if_needed(repo, window, extended_last).await?;
    }

    Err(EngineError::WindowExhausted(min_count))
}

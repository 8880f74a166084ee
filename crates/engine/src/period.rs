//! Period Resolver (SPEC_FULL.md §4.1): map a calendar date to an academic period.

use chrono::{Datelike, NaiveDate};
use examcal_domain::AcademicPeriod;

use crate::error::EngineError;

pub struct ResolvedPeriod {
    pub period_id: String,
    pub display_name: String,
    pub semester_label: String,
}

fn two_digit(year: i32) -> String {
    format!("{:02}", year.rem_euclid(100))
}

/// The candidate period ids to try, most specific first, plus the human label for the
/// semester this date falls in. October through February span a calendar-year boundary
/// ("A" periods); March through September stay within one calendar year ("B" periods).
fn candidates_for(date: NaiveDate) -> (Vec<String>, String) {
    let year = date.year();
    match date.month() {
        10..=12 => {
            let label = format!("{}-{}A", year, year + 1);
            let candidates = vec![
                format!("{}-{}", year, year + 1),
                format!("{}{}A", two_digit(year), two_digit(year + 1)),
            ];
            (candidates, label)
        }
        1 | 2 => {
            let label = format!("{}-{}A", year - 1, year);
            let candidates = vec![
                format!("{}-{}", year - 1, year),
                format!("{}{}A", two_digit(year - 1), two_digit(year)),
            ];
            (candidates, label)
        }
        3..=7 => {
            let label = format!("{}B", year);
            let candidates = vec![format!("{}", year - 1), format!("{}B", two_digit(year))];
            (candidates, label)
        }
        _ => {
            let label = format!("{}B", year);
            let candidates = vec![format!("{}", year - 2), format!("{}B", two_digit(year))];
            (candidates, label)
        }
    }
}

/// Resolve `date` against the known periods. Tries each exact-id candidate in order, then
/// falls back to a substring scan for a period whose id or name carries the right year and
/// semester suffix.
pub fn resolve_period(
    date: NaiveDate,
    known_periods: &[AcademicPeriod],
) -> Result<ResolvedPeriod, EngineError> {
    let (candidates, semester_label) = candidates_for(date);

    for candidate in &candidates {
        if let Some(period) = known_periods.iter().find(|p| &p.id == candidate) {
            return Ok(ResolvedPeriod {
                period_id: period.id.clone(),
                display_name: period.display_name.clone(),
                semester_label,
            });
        }
    }

    let suffix = semester_label.chars().last().unwrap_or('B');
    let year = date.year();
    let year_digits: Vec<String> = [year - 2, year - 1, year, year + 1]
        .into_iter()
        .map(|y| y.to_string())
        .collect();

    let fallback = known_periods.iter().find(|p| {
        let haystack = format!("{} {}", p.id, p.display_name);
        let ends_with_suffix = haystack.trim_end().ends_with(suffix);
        ends_with_suffix && year_digits.iter().any(|y| haystack.contains(y.as_str()))
    });

    match fallback {
        Some(period) => Ok(ResolvedPeriod {
            period_id: period.id.clone(),
            display_name: period.display_name.clone(),
            semester_label,
        }),
        None => Err(EngineError::PeriodNotFound(date)),
    }
}

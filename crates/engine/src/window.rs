//! Window Manager (SPEC_FULL.md §4.2).

use chrono::{Days, NaiveDate};
use examcal_domain::ApplicationWindow;
use examcal_storage::WindowRepository;

use crate::error::EngineError;
use crate::ids::synth_id;

pub const DEFAULT_WINDOW_DAYS: u64 = 21;

/// Fetch or create the application window for `(period_id, evaluation_id)`, pulling
/// `first_date` backward if the caller's start predates it. Never narrows the window.
pub async fn ensure_window(
    repo: &WindowRepository,
    period_id: &str,
    evaluation_id: &str,
    first_date: NaiveDate,
    default_window_days: u64,
) -> Result<ApplicationWindow, EngineError> {
    match repo.get(period_id, evaluation_id).await? {
        Some(mut window) => {
            if first_date < window.first_date {
                repo.update_first_date(&window.id, first_date).await?;
                window.first_date = first_date;
            }
            Ok(window)
        }
        None => {
            let last_date = first_date + Days::new(default_window_days);
            let id = synth_id("AW", &[period_id, evaluation_id]);
            repo.create(&id, period_id, evaluation_id, first_date, last_date)
                .await
                .map_err(EngineError::from)
        }
    }
}

/// Grow `window.last_date` forward if `needed_last_date` falls beyond it. Never shrinks.
pub async fn extend_if_needed(
    repo: &WindowRepository,
    window: &mut ApplicationWindow,
    needed_last_date: NaiveDate,
) -> Result<(), EngineError> {
    if needed_last_date > window.last_date {
        repo.update_last_date(&window.id, needed_last_date).await?;
        window.last_date = needed_last_date;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_spans_twenty_one_days() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let end = start + Days::new(DEFAULT_WINDOW_DAYS);
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 3, 22).unwrap());
    }
}

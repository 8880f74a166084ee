//! Engine-level error taxonomy (SPEC_FULL.md §7). Only `PeriodNotFound` and `Database` abort
//! a generation outright; every other condition is collected as a per-unit conflict instead.

use examcal_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no academic period matches date {0}")]
    PeriodNotFound(chrono::NaiveDate),

    #[error("program {0} has no teaching schedule to expand into an exam workload")]
    ProgramHasNoSchedule(String),

    #[error("application window exhausted before {0} eligible dates could be found")]
    WindowExhausted(usize),

    #[error(transparent)]
    Database(#[from] StorageError),
}

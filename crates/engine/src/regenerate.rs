//! Regeneration Coordinator (SPEC_FULL.md §4.7): always runs first in a generation call,
//! clearing exactly the exam requests this program's current workload will replace.

use examcal_storage::{ExamRepository, TeachingRecordRepository};
use sqlx::{Postgres, Transaction};

use crate::error::EngineError;

/// Resolve the course ids this program teaches in `(period_id)`, then delete every existing
/// exam request for `(period_id, evaluation_id)` whose course is in that set. Other programs'
/// requests, sharing the same period and evaluation, are left untouched.
pub async fn clear_scope(
    teaching_records: &TeachingRecordRepository,
    exam_repo: &ExamRepository,
    tx: &mut Transaction<'_, Postgres>,
    program_id: &str,
    period_id: &str,
    evaluation_id: &str,
) -> Result<Vec<String>, EngineError> {
    let course_ids = teaching_records
        .list_course_ids_for_program_period(program_id, period_id)
        .await?;

    exam_repo
        .delete_scope_tx(tx, period_id, evaluation_id, &course_ids)
        .await?;

    Ok(course_ids)
}

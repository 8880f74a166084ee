//! Persistence for the scheduler-owned tables: windows' dependents, exam requests and their
//! assignments. Grounded on the teacher's `sync_repository.rs` transaction-scoped write style
//! (`pool.begin()` / bind-and-execute against `&mut **tx` / `tx.commit()`).

use chrono::{NaiveDate, NaiveTime};
use examcal_domain::{
    CalendarOverviewRow, CalendarRow, ExamGroup, ExamRequest, ExamStatus, JuryAssignment,
    RoomAssignment,
};
use sqlx::{PgPool, Postgres, Transaction};

use crate::StorageError;

/// An existing room booking, used by the engine's feasibility predicate.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomOccupant {
    pub exam_request_id: String,
    pub room_id: String,
    pub exam_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// An existing invigilator or jury booking for a teacher, used by the assigner.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeacherOccupant {
    pub exam_request_id: String,
    pub teacher_id: String,
    pub exam_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Clone)]
pub struct ExamRepository {
    pool: PgPool,
}

impl ExamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'_, Postgres>, StorageError> {
        self.pool.begin().await.map_err(StorageError::Query)
    }

    /// Delete every exam request (and, by cascade, its groups/assignments) for the given
    /// `(period, evaluation)` whose course belongs to the set resolved by the workload
    /// expander for this program. Never touches requests of other programs' courses.
    pub async fn delete_scope_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        period_id: &str,
        evaluation_id: &str,
        course_ids: &[String],
    ) -> Result<u64, StorageError> {
        if course_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            r#"
            DELETE FROM exam_requests
            WHERE period_id = $1 AND evaluation_id = $2 AND course_id = ANY($3)
            "#,
        )
        .bind(period_id)
        .bind(evaluation_id)
        .bind(course_ids)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::Query)?;

        Ok(result.rows_affected())
    }

    pub async fn insert_request_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &ExamRequest,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO exam_requests
                (id, period_id, evaluation_id, course_id, exam_date, start_time, end_time,
                 status, rejection_reason, manually_edited)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&request.id)
        .bind(&request.period_id)
        .bind(&request.evaluation_id)
        .bind(&request.course_id)
        .bind(request.exam_date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.status as i32)
        .bind(&request.rejection_reason)
        .bind(request.manually_edited)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::Query)?;
        Ok(())
    }

    pub async fn insert_group_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        exam_group: &ExamGroup,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO exam_groups (id, exam_request_id, group_id) VALUES ($1, $2, $3)",
        )
        .bind(&exam_group.id)
        .bind(&exam_group.exam_request_id)
        .bind(&exam_group.group_id)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::Query)?;
        Ok(())
    }

    pub async fn insert_room_assignment_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        assignment: &RoomAssignment,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO room_assignments (id, exam_request_id, room_id, invigilator_teacher_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&assignment.id)
        .bind(&assignment.exam_request_id)
        .bind(&assignment.room_id)
        .bind(&assignment.invigilator_teacher_id)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::Query)?;
        Ok(())
    }

    pub async fn insert_jury_assignment_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        assignment: &JuryAssignment,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO jury_assignments (id, exam_request_id, teacher_id) VALUES ($1, $2, $3)",
        )
        .bind(&assignment.id)
        .bind(&assignment.exam_request_id)
        .bind(&assignment.teacher_id)
        .execute(&mut **tx)
        .await
        .map_err(StorageError::Query)?;
        Ok(())
    }

    /// Committed room bookings for a period/evaluation, excluding rejected requests.
    /// Spans all programs — room conflicts are a cross-program invariant.
    pub async fn list_room_occupancy(
        &self,
        period_id: &str,
        evaluation_id: &str,
    ) -> Result<Vec<RoomOccupant>, StorageError> {
        sqlx::query_as::<_, RoomOccupant>(
            r#"
            SELECT er.id AS exam_request_id, ra.room_id, er.exam_date, er.start_time, er.end_time
            FROM exam_requests er
            JOIN room_assignments ra ON ra.exam_request_id = er.id
            WHERE er.period_id = $1 AND er.evaluation_id = $2 AND er.status <> 2
            "#,
        )
        .bind(period_id)
        .bind(evaluation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    /// Committed invigilator bookings for a period/evaluation, excluding rejected requests.
    pub async fn list_invigilator_occupancy(
        &self,
        period_id: &str,
        evaluation_id: &str,
    ) -> Result<Vec<TeacherOccupant>, StorageError> {
        sqlx::query_as::<_, TeacherOccupant>(
            r#"
            SELECT er.id AS exam_request_id, ra.invigilator_teacher_id AS teacher_id,
                   er.exam_date, er.start_time, er.end_time
            FROM exam_requests er
            JOIN room_assignments ra ON ra.exam_request_id = er.id
            WHERE er.period_id = $1 AND er.evaluation_id = $2 AND er.status <> 2
            "#,
        )
        .bind(period_id)
        .bind(evaluation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    /// Committed jury bookings for a period/evaluation, excluding rejected requests.
    pub async fn list_jury_occupancy(
        &self,
        period_id: &str,
        evaluation_id: &str,
    ) -> Result<Vec<TeacherOccupant>, StorageError> {
        sqlx::query_as::<_, TeacherOccupant>(
            r#"
            SELECT er.id AS exam_request_id, ja.teacher_id, er.exam_date, er.start_time, er.end_time
            FROM exam_requests er
            JOIN jury_assignments ja ON ja.exam_request_id = er.id
            WHERE er.period_id = $1 AND er.evaluation_id = $2 AND er.status <> 2
            "#,
        )
        .bind(period_id)
        .bind(evaluation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    /// The "get calendar for program" projection (SPEC_FULL.md §6).
    pub async fn list_calendar_for_program(
        &self,
        program_id: &str,
    ) -> Result<Vec<CalendarRow>, StorageError> {
        let rows = sqlx::query_as::<_, CalendarRowQuery>(
            r#"
            SELECT
                er.id AS exam_request_id,
                er.course_id,
                c.name AS course_name,
                g.id AS group_id,
                g.name AS group_name,
                t.name AS teacher_name,
                er.exam_date,
                er.start_time,
                er.end_time,
                r.name AS room_name,
                er.status,
                ap.display_name AS period_name,
                ek.name AS evaluation_name,
                er.rejection_reason
            FROM exam_requests er
            JOIN exam_groups eg ON eg.exam_request_id = er.id
            JOIN groups g ON g.id = eg.group_id
            JOIN courses c ON c.id = er.course_id
            JOIN academic_periods ap ON ap.id = er.period_id
            JOIN evaluation_kinds ek ON ek.id = er.evaluation_id
            LEFT JOIN room_assignments ra ON ra.exam_request_id = er.id
            LEFT JOIN rooms r ON r.id = ra.room_id
            LEFT JOIN teachers t ON t.id = ra.invigilator_teacher_id
            WHERE g.program_id = $1
            ORDER BY er.exam_date, er.start_time, c.id, g.id
            "#,
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)?;

        let occupancy = self
            .list_room_occupancy_all_periods_for_rooms(&rows)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let room_conflict = match &row.room_name {
                    None => true,
                    Some(_) => occupancy
                        .iter()
                        .filter(|o| o.exam_request_id != row.exam_request_id)
                        .any(|o| {
                            o.exam_date == row.exam_date
                                && intervals_overlap(
                                    o.start_time,
                                    o.end_time,
                                    row.start_time,
                                    row.end_time,
                                )
                        }),
                };
                CalendarRow {
                    exam_request_id: row.exam_request_id,
                    course_id: row.course_id,
                    course_name: row.course_name,
                    group_id: row.group_id,
                    group_name: row.group_name,
                    teacher_name: row.teacher_name,
                    exam_date: row.exam_date,
                    start_time: row.start_time,
                    end_time: row.end_time,
                    room_name: row.room_name,
                    room_conflict,
                    status: status_label(ExamStatus::from(row.status)),
                    period_name: row.period_name,
                    evaluation_name: row.evaluation_name,
                    rejection_reason: row.rejection_reason,
                }
            })
            .collect())
    }

    /// Narrow helper backing the `roomConflict` flag: occupancy of only the rooms that
    /// appear in `rows`, across the same exam dates.
    async fn list_room_occupancy_all_periods_for_rooms(
        &self,
        rows: &[CalendarRowQuery],
    ) -> Result<Vec<RoomOccupant>, StorageError> {
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.exam_date).collect();
        if dates.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, RoomOccupant>(
            r#"
            SELECT er.id AS exam_request_id, ra.room_id, er.exam_date, er.start_time, er.end_time
            FROM exam_requests er
            JOIN room_assignments ra ON ra.exam_request_id = er.id
            WHERE er.exam_date = ANY($1) AND er.status <> 2
            "#,
        )
        .bind(&dates)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    /// Bulk status transition over the exact selector the Regeneration Coordinator uses:
    /// every exam request whose course is taught in `(program, period)` for `evaluation`.
    pub async fn bulk_set_status(
        &self,
        program_id: &str,
        period_id: &str,
        evaluation_id: &str,
        status: ExamStatus,
        rejection_reason: Option<&str>,
    ) -> Result<usize, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE exam_requests er
            SET status = $1, rejection_reason = $2
            FROM teaching_records tr
            JOIN groups g ON g.id = tr.group_id
            WHERE tr.course_id = er.course_id
              AND tr.period_id = er.period_id
              AND g.program_id = $3
              AND er.period_id = $4
              AND er.evaluation_id = $5
            "#,
        )
        .bind(status as i32)
        .bind(rejection_reason)
        .bind(program_id)
        .bind(period_id)
        .bind(evaluation_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Query)?;

        Ok(result.rows_affected() as usize)
    }

    /// The registrar-facing grouped overview (SPEC_FULL.md §9a.6): per-program status counts
    /// across every exam request, regardless of period or evaluation.
    pub async fn list_overview_by_program(&self) -> Result<Vec<CalendarOverviewRow>, StorageError> {
        let rows = sqlx::query_as::<_, OverviewRowQuery>(
            r#"
            SELECT
                p.id AS program_id,
                p.name AS program_name,
                COUNT(*) FILTER (WHERE er.status = 0) AS pending_count,
                COUNT(*) FILTER (WHERE er.status = 1) AS approved_count,
                COUNT(*) FILTER (WHERE er.status = 2) AS rejected_count
            FROM programs p
            JOIN groups g ON g.program_id = p.id
            JOIN exam_groups eg ON eg.group_id = g.id
            JOIN exam_requests er ON er.id = eg.exam_request_id
            GROUP BY p.id, p.name
            ORDER BY p.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)?;

        Ok(rows
            .into_iter()
            .map(|row| CalendarOverviewRow {
                program_id: row.program_id,
                program_name: row.program_name,
                pending_count: row.pending_count as usize,
                approved_count: row.approved_count as usize,
                rejected_count: row.rejected_count as usize,
            })
            .collect())
    }

    /// Whether any exam request has ever been generated for this program, across every
    /// period/evaluation. Backs the existence-check projection (SPEC_FULL.md §9a.6).
    pub async fn count_requests_for_program(&self, program_id: &str) -> Result<i64, StorageError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(DISTINCT er.id)
            FROM exam_requests er
            JOIN exam_groups eg ON eg.exam_request_id = er.id
            JOIN groups g ON g.id = eg.group_id
            WHERE g.program_id = $1
            "#,
        )
        .bind(program_id)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Query)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct OverviewRowQuery {
    program_id: String,
    program_name: String,
    pending_count: i64,
    approved_count: i64,
    rejected_count: i64,
}

fn intervals_overlap(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && b_start < a_end
}

fn status_label(status: ExamStatus) -> String {
    match status {
        ExamStatus::Pending => "pending",
        ExamStatus::Approved => "approved",
        ExamStatus::Rejected => "rejected",
    }
    .to_string()
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct CalendarRowQuery {
    exam_request_id: String,
    course_id: String,
    course_name: String,
    group_id: String,
    group_name: String,
    teacher_name: Option<String>,
    exam_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    room_name: Option<String>,
    status: i32,
    period_name: String,
    evaluation_name: String,
    rejection_reason: Option<String>,
}

//! Read-only repositories over the reference data the scheduler consumes but never mutates:
//! periods, evaluation kinds, courses, groups, teachers, rooms, teaching records and jury
//! permissions. All rows here are owned by the upstream enrollment system.

use examcal_domain::{AcademicPeriod, Course, EvaluationKind, Group, JuryPermission, Room, Teacher, TeachingRecord};
use sqlx::PgPool;

use crate::StorageError;

#[derive(Clone)]
pub struct PeriodRepository {
    pool: PgPool,
}

impl PeriodRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<AcademicPeriod>, StorageError> {
        sqlx::query_as::<_, AcademicPeriod>(
            "SELECT id, display_name FROM academic_periods ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    pub async fn get(&self, id: &str) -> Result<Option<AcademicPeriod>, StorageError> {
        sqlx::query_as::<_, AcademicPeriod>(
            "SELECT id, display_name FROM academic_periods WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Query)
    }
}

#[derive(Clone)]
pub struct EvaluationRepository {
    pool: PgPool,
}

impl EvaluationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: &str) -> Result<Option<EvaluationKind>, StorageError> {
        sqlx::query_as::<_, EvaluationKind>("SELECT id, name FROM evaluation_kinds WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Query)
    }
}

#[derive(Clone)]
pub struct CourseRepository {
    pool: PgPool,
}

impl CourseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Course>, StorageError> {
        sqlx::query_as::<_, Course>(
            "SELECT id, name, is_academy, exam_mode FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    pub async fn get_many(&self, ids: &[String]) -> Result<Vec<Course>, StorageError> {
        sqlx::query_as::<_, Course>(
            "SELECT id, name, is_academy, exam_mode FROM courses WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }
}

#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_program(&self, program_id: &str) -> Result<Vec<Group>, StorageError> {
        sqlx::query_as::<_, Group>(
            "SELECT id, name, headcount, program_id FROM groups WHERE program_id = $1 ORDER BY id",
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Group>, StorageError> {
        sqlx::query_as::<_, Group>(
            "SELECT id, name, headcount, program_id FROM groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Query)
    }
}

#[derive(Clone)]
pub struct TeacherRepository {
    pool: PgPool,
}

impl TeacherRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_active(&self) -> Result<Vec<Teacher>, StorageError> {
        sqlx::query_as::<_, Teacher>(
            "SELECT id, name, disabled FROM teachers WHERE disabled = false ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Teacher>, StorageError> {
        sqlx::query_as::<_, Teacher>("SELECT id, name, disabled FROM teachers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Query)
    }
}

#[derive(Clone)]
pub struct RoomRepository {
    pool: PgPool,
}

impl RoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_active(&self) -> Result<Vec<Room>, StorageError> {
        sqlx::query_as::<_, Room>(
            "SELECT id, name, capacity, disabled FROM rooms WHERE disabled = false ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    /// Ids of rooms flagged as computer labs.
    pub async fn list_computer_lab_ids(&self) -> Result<Vec<String>, StorageError> {
        sqlx::query_scalar::<_, String>("SELECT room_id FROM computer_labs")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Query)
    }
}

#[derive(Clone)]
pub struct TeachingRecordRepository {
    pool: PgPool,
}

impl TeachingRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Teaching records for a program's groups in a specific period.
    pub async fn list_for_program_period(
        &self,
        program_id: &str,
        period_id: &str,
    ) -> Result<Vec<TeachingRecord>, StorageError> {
        sqlx::query_as::<_, TeachingRecord>(
            r#"
            SELECT tr.id, tr.period_id, tr.course_id, tr.group_id, tr.teacher_id, tr.room_id,
                   tr.day_of_week, tr.start_time, tr.end_time
            FROM teaching_records tr
            JOIN groups g ON g.id = tr.group_id
            WHERE g.program_id = $1 AND tr.period_id = $2
            ORDER BY tr.course_id, tr.group_id, tr.day_of_week, tr.start_time
            "#,
        )
        .bind(program_id)
        .bind(period_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    /// All teaching records (any period) for a single group, used to backfill groups
    /// missing from the target period's snapshot.
    pub async fn list_for_group_any_period(
        &self,
        group_id: &str,
    ) -> Result<Vec<TeachingRecord>, StorageError> {
        sqlx::query_as::<_, TeachingRecord>(
            r#"
            SELECT id, period_id, course_id, group_id, teacher_id, room_id,
                   day_of_week, start_time, end_time
            FROM teaching_records
            WHERE group_id = $1
            ORDER BY course_id, day_of_week, start_time
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    /// Course ids taught to any group of a program within a period — used by the
    /// Regeneration Coordinator to scope which exam requests belong to this program.
    pub async fn list_course_ids_for_program_period(
        &self,
        program_id: &str,
        period_id: &str,
    ) -> Result<Vec<String>, StorageError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT tr.course_id
            FROM teaching_records tr
            JOIN groups g ON g.id = tr.group_id
            WHERE g.program_id = $1 AND tr.period_id = $2
            "#,
        )
        .bind(program_id)
        .bind(period_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }
}

#[derive(Clone)]
pub struct JuryPermissionRepository {
    pool: PgPool,
}

impl JuryPermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_course(&self, course_id: &str) -> Result<Vec<JuryPermission>, StorageError> {
        sqlx::query_as::<_, JuryPermission>(
            "SELECT id, teacher_id, course_id FROM jury_permissions WHERE course_id = $1 ORDER BY id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Query)
    }
}

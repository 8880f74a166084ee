//! Storage layer for the examination calendar scheduler.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod exam_repository;
pub mod program_repository;
pub mod reference_repository;
pub mod window_repository;

pub use error::StorageError;
pub use exam_repository::{ExamRepository, RoomOccupant, TeacherOccupant};
pub use program_repository::ProgramRepository;
pub use reference_repository::{
    CourseRepository, EvaluationRepository, GroupRepository, JuryPermissionRepository,
    PeriodRepository, RoomRepository, TeacherRepository, TeachingRecordRepository,
};
pub use window_repository::WindowRepository;

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool, StorageError> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(StorageError::Connection)
}

/// Run database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(StorageError::Migration)
}

/// Check database connectivity.
pub async fn check_connection(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(StorageError::Query)?;
    Ok(())
}

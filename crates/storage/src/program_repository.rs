//! Read-only access to programs.

use examcal_domain::Program;
use sqlx::PgPool;

use crate::StorageError;

#[derive(Clone)]
pub struct ProgramRepository {
    pool: PgPool,
}

impl ProgramRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Program>, StorageError> {
        sqlx::query_as::<_, Program>("SELECT id, name FROM programs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Query)
    }

    pub async fn list(&self) -> Result<Vec<Program>, StorageError> {
        sqlx::query_as::<_, Program>("SELECT id, name FROM programs ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Query)
    }
}

//! Application window persistence (SPEC_FULL.md §4.2).

use chrono::NaiveDate;
use examcal_domain::ApplicationWindow;
use sqlx::PgPool;

use crate::StorageError;

#[derive(Clone)]
pub struct WindowRepository {
    pool: PgPool,
}

impl WindowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(
        &self,
        period_id: &str,
        evaluation_id: &str,
    ) -> Result<Option<ApplicationWindow>, StorageError> {
        sqlx::query_as::<_, ApplicationWindow>(
            r#"
            SELECT id, period_id, evaluation_id, first_date, last_date
            FROM application_windows
            WHERE period_id = $1 AND evaluation_id = $2
            "#,
        )
        .bind(period_id)
        .bind(evaluation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    pub async fn create(
        &self,
        id: &str,
        period_id: &str,
        evaluation_id: &str,
        first_date: NaiveDate,
        last_date: NaiveDate,
    ) -> Result<ApplicationWindow, StorageError> {
        sqlx::query_as::<_, ApplicationWindow>(
            r#"
            INSERT INTO application_windows (id, period_id, evaluation_id, first_date, last_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, period_id, evaluation_id, first_date, last_date
            "#,
        )
        .bind(id)
        .bind(period_id)
        .bind(evaluation_id)
        .bind(first_date)
        .bind(last_date)
        .fetch_one(&self.pool)
        .await
        .map_err(StorageError::Query)
    }

    pub async fn update_first_date(
        &self,
        id: &str,
        first_date: NaiveDate,
    ) -> Result<(), StorageError> {
        sqlx::query("UPDATE application_windows SET first_date = $1 WHERE id = $2")
            .bind(first_date)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Query)?;
        Ok(())
    }

    pub async fn update_last_date(
        &self,
        id: &str,
        last_date: NaiveDate,
    ) -> Result<(), StorageError> {
        sqlx::query("UPDATE application_windows SET last_date = $1 WHERE id = $2")
            .bind(last_date)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Query)?;
        Ok(())
    }
}

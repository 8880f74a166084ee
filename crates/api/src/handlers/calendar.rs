//! Handlers for the calendar-generation command and its two read projections (SPEC_FULL.md §6).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use examcal_domain::{
    CalendarExistsResponse, CalendarOverviewResponse, CalendarResponse, DomainError,
    GenerateCalendarRequest, GenerateCalendarResponse,
};
use examcal_engine::EngineError;
use validator::Validate;

use crate::AppState;
use crate::middleware::auth::AuthUser;

fn map_engine_error(error: EngineError) -> DomainError {
    match error {
        EngineError::PeriodNotFound(date) => {
            DomainError::NotFound(format!("no academic period matches date {date}"))
        }
        EngineError::ProgramHasNoSchedule(program_id) => DomainError::BusinessLogic(format!(
            "program {program_id} has no teaching schedule to expand into an exam workload"
        )),
        EngineError::WindowExhausted(min_count) => DomainError::BusinessLogic(format!(
            "application window exhausted before {min_count} eligible dates could be found"
        )),
        EngineError::Database(storage_error) => DomainError::Database(storage_error.to_string()),
    }
}

/// `POST /v1/calendar/generate`
pub async fn generate_calendar(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Json(request): Json<GenerateCalendarRequest>,
) -> Result<Json<GenerateCalendarResponse>, DomainError> {
    request
        .validate()
        .map_err(DomainError::from_validation_errors)?;

    let response = state
        .generation_service
        .generate(&request)
        .await
        .map_err(map_engine_error)?;

    Ok(Json(response))
}

/// `GET /v1/programs/{program_id}/calendar`
pub async fn get_calendar(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(program_id): Path<String>,
) -> Result<Json<CalendarResponse>, DomainError> {
    let rows = state
        .exam_repo
        .list_calendar_for_program(&program_id)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

    Ok(Json(CalendarResponse { rows }))
}

/// `GET /v1/calendar/overview` — registrar-facing grouped status counts per program.
pub async fn get_calendar_overview(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
) -> Result<Json<CalendarOverviewResponse>, DomainError> {
    let programs = state
        .exam_repo
        .list_overview_by_program()
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;
    Ok(Json(CalendarOverviewResponse { programs }))
}

/// `GET /v1/programs/{program_id}/calendar/exists` — whether a calendar has ever been
/// generated for this program, regardless of period or evaluation.
pub async fn get_calendar_exists(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Path(program_id): Path<String>,
) -> Result<Json<CalendarExistsResponse>, DomainError> {
    let total_requests = state
        .exam_repo
        .count_requests_for_program(&program_id)
        .await
        .map_err(|e| DomainError::Database(e.to_string()))?;

    Ok(Json(CalendarExistsResponse {
        exists: total_requests > 0,
        total_requests: total_requests as usize,
    }))
}

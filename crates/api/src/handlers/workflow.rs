//! Bulk submission-workflow transitions (SPEC_FULL.md §6): submit, bulk-approve, bulk-reject.
//! All three operate over the exact `(program, period, evaluation)` selector the Regeneration
//! Coordinator uses, and never touch a request outside that scope.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use examcal_domain::{
    BulkRejectRequest, BulkTransitionResponse, BulkTransitionScope, DomainError, ExamStatus,
};
use validator::Validate;

use crate::AppState;
use crate::middleware::auth::AuthUser;

/// `POST /v1/calendar/submit`
pub async fn submit(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Json(scope): Json<BulkTransitionScope>,
) -> Result<Json<BulkTransitionResponse>, DomainError> {
    scope
        .validate()
        .map_err(DomainError::from_validation_errors)?;

    let affected_count = set_status(&state, &scope, ExamStatus::Pending, None).await?;
    Ok(Json(BulkTransitionResponse { affected_count }))
}

/// `POST /v1/calendar/bulk-approve`
pub async fn bulk_approve(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Json(scope): Json<BulkTransitionScope>,
) -> Result<Json<BulkTransitionResponse>, DomainError> {
    scope
        .validate()
        .map_err(DomainError::from_validation_errors)?;

    let affected_count = set_status(&state, &scope, ExamStatus::Approved, None).await?;
    Ok(Json(BulkTransitionResponse { affected_count }))
}

/// `POST /v1/calendar/bulk-reject`
pub async fn bulk_reject(
    State(state): State<Arc<AppState>>,
    AuthUser(_claims): AuthUser,
    Json(request): Json<BulkRejectRequest>,
) -> Result<Json<BulkTransitionResponse>, DomainError> {
    request
        .validate()
        .map_err(DomainError::from_validation_errors)?;

    let affected_count = set_status(
        &state,
        &request.scope,
        ExamStatus::Rejected,
        Some(request.reason.as_str()),
    )
    .await?;
    Ok(Json(BulkTransitionResponse { affected_count }))
}

async fn set_status(
    state: &AppState,
    scope: &BulkTransitionScope,
    status: ExamStatus,
    rejection_reason: Option<&str>,
) -> Result<usize, DomainError> {
    state
        .exam_repo
        .bulk_set_status(
            &scope.program_id,
            &scope.period_id,
            &scope.evaluation_id,
            status,
            rejection_reason,
        )
        .await
        .map_err(|e| DomainError::Database(e.to_string()))
}

//! Request/response shapes for the external interfaces (SPEC_FULL.md §6).

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for the "generate calendar" command.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateCalendarRequest {
    #[validate(length(min = 1))]
    pub program_id: String,
    pub start_date: NaiveDate,
    #[validate(length(min = 1))]
    pub evaluation_id: String,
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

/// A single unscheduled unit reported back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictReport {
    pub course_id: String,
    pub group_id: String,
    pub reason: String,
}

/// Response body for the "generate calendar" command.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateCalendarResponse {
    pub created_count: usize,
    pub conflicts: Vec<ConflictReport>,
    pub warnings: Vec<String>,
    pub resolved_period_display_name: String,
    pub resolved_semester_label: String,
}

/// One row of the "get calendar for program" projection: an (exam request, group) pair.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarRow {
    pub exam_request_id: String,
    pub course_id: String,
    pub course_name: String,
    pub group_id: String,
    pub group_name: String,
    pub teacher_name: Option<String>,
    pub exam_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_name: Option<String>,
    pub room_conflict: bool,
    pub status: String,
    pub period_name: String,
    pub evaluation_name: String,
    pub rejection_reason: Option<String>,
}

/// Response body for the "get calendar for program" query.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarResponse {
    pub rows: Vec<CalendarRow>,
}

/// A single program's summary row in the registrar-facing overview (§9a.6).
#[derive(Debug, Clone, Serialize)]
pub struct CalendarOverviewRow {
    pub program_id: String,
    pub program_name: String,
    pub pending_count: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
}

/// Response body for the registrar-facing grouped overview.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarOverviewResponse {
    pub programs: Vec<CalendarOverviewRow>,
}

/// Request body shared by the bulk-transition endpoints.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkTransitionScope {
    #[validate(length(min = 1))]
    pub program_id: String,
    #[validate(length(min = 1))]
    pub period_id: String,
    #[validate(length(min = 1))]
    pub evaluation_id: String,
}

/// Request body for the bulk-reject endpoint, which additionally carries a reason.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkRejectRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub scope: BulkTransitionScope,
    #[validate(length(min = 1))]
    pub reason: String,
}

/// Response body for all three bulk-transition endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct BulkTransitionResponse {
    pub affected_count: usize,
}

/// Response body for the existence-check projection (SPEC_FULL.md §9a.6): whether any
/// calendar has ever been generated for a program, across every period/evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarExistsResponse {
    pub exists: bool,
    pub total_requests: usize,
}

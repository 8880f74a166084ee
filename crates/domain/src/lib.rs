//! Domain types for the examination calendar scheduler.

pub mod auth;
pub mod dto;
pub mod errors;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub use auth::*;
pub use dto::*;
pub use errors::*;

/// A faculty program ("career"). Owns groups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Program {
    pub id: String,
    pub name: String,
}

/// Coarse policy classification of a program, used to pick a scheduling strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgramClass {
    Social,
    HealthLike,
}

const SOCIAL_MARKERS: &[&str] = &["informatic", "business", "administra", "derecho", "contadur"];

impl ProgramClass {
    /// Classify a program by a case-insensitive substring match over its id and name.
    ///
    /// Grounded on the original source's `es_ciencias_sociales` helper.
    pub fn classify(program: &Program) -> Self {
        let haystack = format!("{} {}", program.id, program.name).to_lowercase();
        if SOCIAL_MARKERS.iter().any(|marker| haystack.contains(marker)) {
            ProgramClass::Social
        } else {
            ProgramClass::HealthLike
        }
    }
}

/// An academic period (e.g. "2025-2026A").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct AcademicPeriod {
    pub id: String,
    pub display_name: String,
}

/// A graded evaluation moment within a period (Partial 1/2/3, Ordinary).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct EvaluationKind {
    pub id: String,
    pub name: String,
}

/// The mode an exam is delivered in, which constrains room eligibility.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExamMode {
    Written,
    Platform,
}

impl Default for ExamMode {
    fn default() -> Self {
        ExamMode::Platform
    }
}

/// A course ("materia").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub is_academy: bool,
    pub exam_mode: ExamMode,
}

/// A group of students within a program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub headcount: i32,
    pub program_id: String,
}

/// A teacher, who may act as class instructor, invigilator, or jury.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub disabled: bool,
}

/// A room. ComputerLab status is tracked in a side table (`computer_labs`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub capacity: i32,
    pub disabled: bool,
}

/// One weekly class meeting: (course, group) taught by a teacher in a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct TeachingRecord {
    pub id: String,
    pub period_id: String,
    pub course_id: String,
    pub group_id: String,
    pub teacher_id: String,
    pub room_id: String,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Authorization for a teacher to act as jury ("sinodal") for a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct JuryPermission {
    pub id: String,
    pub teacher_id: String,
    pub course_id: String,
}

/// The inclusive date range within which exam dates for (period, evaluation) must fall.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct ApplicationWindow {
    pub id: String,
    pub period_id: String,
    pub evaluation_id: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// The status of an exam request's submission workflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "int4")]
#[repr(i32)]
pub enum ExamStatus {
    Pending = 0,
    Approved = 1,
    Rejected = 2,
}

impl From<i32> for ExamStatus {
    fn from(value: i32) -> Self {
        match value {
            1 => ExamStatus::Approved,
            2 => ExamStatus::Rejected,
            _ => ExamStatus::Pending,
        }
    }
}

/// A single scheduled exam for a course within a period/evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct ExamRequest {
    pub id: String,
    pub period_id: String,
    pub evaluation_id: String,
    pub course_id: String,
    pub exam_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ExamStatus,
    pub rejection_reason: Option<String>,
    pub manually_edited: bool,
}

/// The group being evaluated by an exam request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct ExamGroup {
    pub id: String,
    pub exam_request_id: String,
    pub group_id: String,
}

/// The room and invigilator assigned to an exam request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct RoomAssignment {
    pub id: String,
    pub exam_request_id: String,
    pub room_id: String,
    pub invigilator_teacher_id: String,
}

/// The jury teacher assigned to an exam request, when the course requires one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct JuryAssignment {
    pub id: String,
    pub exam_request_id: String,
    pub teacher_id: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub build_sha: String,
    pub uptime_seconds: u64,
}

/// Ready check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub database: String,
}

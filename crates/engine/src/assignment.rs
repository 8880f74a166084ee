//! Invigilator/Juror Assigner (SPEC_FULL.md §4.6).

use examcal_domain::{JuryPermission, Teacher, TeachingRecord};

use crate::ledger::ReservationLedger;
use crate::placement::Placed;

pub const DEFAULT_MAX_JURY_LOAD: usize = 3;

/// Outcome of assigning an invigilator to a placed exam.
pub enum InvigilatorOutcome {
    Assigned(String),
    Conflict(String),
}

/// Choose an invigilator for `placed`: prefer the class's own teacher, falling back to the
/// first active teacher with no overlapping commitment. No eligible teacher is a conflict —
/// every exam needs exactly one invigilator.
pub fn assign_invigilator(
    placed: &Placed,
    class_teacher: &TeachingRecord,
    active_teachers: &[Teacher],
    ledger: &mut ReservationLedger,
) -> InvigilatorOutcome {
    if !active_teachers.iter().any(|t| t.id == class_teacher.teacher_id && !t.disabled) {
        return fallback_invigilator(placed, active_teachers, ledger);
    }

    if ledger.invigilator_is_free(
        &class_teacher.teacher_id,
        placed.exam_date,
        placed.start_time,
        placed.end_time,
    ) {
        ledger.reserve_invigilator(
            &class_teacher.teacher_id,
            placed.exam_date,
            placed.start_time,
            placed.end_time,
        );
        return InvigilatorOutcome::Assigned(class_teacher.teacher_id.clone());
    }

    fallback_invigilator(placed, active_teachers, ledger)
}

fn fallback_invigilator(
    placed: &Placed,
    active_teachers: &[Teacher],
    ledger: &mut ReservationLedger,
) -> InvigilatorOutcome {
    let mut candidates: Vec<&Teacher> = active_teachers.iter().filter(|t| !t.disabled).collect();
    candidates.sort_by(|a, b| a.id.cmp(&b.id));

    for teacher in candidates {
        if ledger.invigilator_is_free(&teacher.id, placed.exam_date, placed.start_time, placed.end_time) {
            ledger.reserve_invigilator(&teacher.id, placed.exam_date, placed.start_time, placed.end_time);
            return InvigilatorOutcome::Assigned(teacher.id.clone());
        }
    }

    InvigilatorOutcome::Conflict("no active teacher is free to invigilate this exam".to_string())
}

/// Outcome of assigning a jury member. `None` means no jury is required/available and is not
/// itself an error — a course can simply have no jury permissions on file.
pub enum JuryOutcome {
    Assigned(String),
    NoneAvailable,
}

/// Choose a jury member for `placed`'s course: candidates are jury-permission holders who
/// are not also the class's own teacher, not already loaded with `max_jury_load` exams for
/// this generation run, and free at the exam's time. First eligible match, by id, wins.
pub fn assign_jury(
    placed: &Placed,
    permissions: &[JuryPermission],
    class_teacher_id: &str,
    max_jury_load: usize,
    ledger: &mut ReservationLedger,
) -> JuryOutcome {
    let mut candidates: Vec<&JuryPermission> = permissions
        .iter()
        .filter(|p| p.teacher_id != class_teacher_id)
        .collect();
    candidates.sort_by(|a, b| a.teacher_id.cmp(&b.teacher_id));

    for permission in candidates {
        if ledger.jury_load(&permission.teacher_id) >= max_jury_load {
            continue;
        }
        if !ledger.jury_is_free(&permission.teacher_id, placed.exam_date, placed.start_time, placed.end_time) {
            continue;
        }
        ledger.reserve_jury(&permission.teacher_id, placed.exam_date, placed.start_time, placed.end_time);
        return JuryOutcome::Assigned(permission.teacher_id.clone());
    }

    JuryOutcome::NoneAvailable
}

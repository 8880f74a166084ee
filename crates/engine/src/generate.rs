//! `GenerationService`: top-level orchestration of a "generate calendar" command, tying the
//! Period Resolver, Window Manager, Regeneration Coordinator, Workload Expander, Day
//! Allocator, Slot & Room Picker and Invigilator/Juror Assigner into a single transaction.

use std::collections::{HashMap, HashSet};

use examcal_domain::{
    ConflictReport, Course, ExamGroup, ExamRequest, ExamStatus, GenerateCalendarRequest,
    GenerateCalendarResponse, JuryAssignment, ProgramClass, RoomAssignment,
};
use examcal_storage::{
    CourseRepository, ExamRepository, GroupRepository, JuryPermissionRepository,
    PeriodRepository, ProgramRepository, RoomRepository, TeacherRepository,
    TeachingRecordRepository, WindowRepository,
};
use tracing::{info, warn};

use crate::assignment::{assign_invigilator, assign_jury, InvigilatorOutcome, JuryOutcome};
use crate::days::ensure_eligible_dates;
use crate::error::EngineError;
use crate::ids::synth_id_fresh;
use crate::ledger::ReservationLedger;
use crate::period::resolve_period;
use crate::placement::{place_health_like, place_social, PlacementOutcome, RoomPool};
use crate::regenerate::clear_scope;
use crate::window::ensure_window;
use crate::workload::{expand, ExamUnit};

/// Bundles the repositories a generation run needs. Constructed once per request with a
/// shared connection pool, by the caller (the API layer).
#[derive(Clone)]
pub struct GenerationService {
    periods: PeriodRepository,
    programs: ProgramRepository,
    groups: GroupRepository,
    teaching_records: TeachingRecordRepository,
    courses: CourseRepository,
    teachers: TeacherRepository,
    rooms: RoomRepository,
    jury_permissions: JuryPermissionRepository,
    windows: WindowRepository,
    exams: ExamRepository,
    default_window_days: u64,
    max_jury_load: usize,
}

impl GenerationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        periods: PeriodRepository,
        programs: ProgramRepository,
        groups: GroupRepository,
        teaching_records: TeachingRecordRepository,
        courses: CourseRepository,
        teachers: TeacherRepository,
        rooms: RoomRepository,
        jury_permissions: JuryPermissionRepository,
        windows: WindowRepository,
        exams: ExamRepository,
        default_window_days: u64,
        max_jury_load: usize,
    ) -> Self {
        Self {
            periods,
            programs,
            groups,
            teaching_records,
            courses,
            teachers,
            rooms,
            jury_permissions,
            windows,
            exams,
            default_window_days,
            max_jury_load,
        }
    }

    pub async fn generate(
        &self,
        request: &GenerateCalendarRequest,
    ) -> Result<GenerateCalendarResponse, EngineError> {
        let program = self
            .programs
            .get(&request.program_id)
            .await?
            .ok_or_else(|| EngineError::ProgramHasNoSchedule(request.program_id.clone()))?;
        let class = ProgramClass::classify(&program);

        let known_periods = self.periods.list().await?;
        let resolved = resolve_period(request.start_date, &known_periods)?;

        let groups = self.groups.list_by_program(&request.program_id).await?;
        let period_records = self
            .teaching_records
            .list_for_program_period(&request.program_id, &resolved.period_id)
            .await?;

        let mut fallback_by_group: HashMap<String, Vec<_>> = HashMap::new();
        let groups_with_period_records: HashSet<&str> =
            period_records.iter().map(|r| r.group_id.as_str()).collect();
        for group in &groups {
            if groups_with_period_records.contains(group.id.as_str()) {
                continue;
            }
            let records = self.teaching_records.list_for_group_any_period(&group.id).await?;
            fallback_by_group.insert(group.id.clone(), records);
        }

        let units = expand(&groups, &period_records, &fallback_by_group);
        if units.is_empty() {
            return Err(EngineError::ProgramHasNoSchedule(request.program_id.clone()));
        }

        let mut window = ensure_window(
            &self.windows,
            &resolved.period_id,
            &request.evaluation_id,
            request.start_date,
            self.default_window_days,
        )
        .await?;

        let depth = units_depth(&units);
        let holidays: HashSet<_> = request.holidays.iter().copied().collect();
        let eligible_dates = ensure_eligible_dates(
            &self.windows,
            &mut window,
            request.start_date,
            &holidays,
            depth,
        )
        .await?;

        let mut ledger = ReservationLedger::new();
        for occupant in self
            .exams
            .list_room_occupancy(&resolved.period_id, &request.evaluation_id)
            .await?
        {
            ledger.seed_room(&occupant.room_id, occupant.exam_date, occupant.start_time, occupant.end_time);
        }
        for occupant in self
            .exams
            .list_invigilator_occupancy(&resolved.period_id, &request.evaluation_id)
            .await?
        {
            ledger.seed_invigilator(&occupant.teacher_id, occupant.exam_date, occupant.start_time, occupant.end_time);
        }
        for occupant in self
            .exams
            .list_jury_occupancy(&resolved.period_id, &request.evaluation_id)
            .await?
        {
            ledger.seed_jury(&occupant.teacher_id, occupant.exam_date, occupant.start_time, occupant.end_time);
        }

        let course_ids: Vec<String> = units.iter().map(|u| u.course_id.clone()).collect();
        let courses = self.courses.get_many(&course_ids).await?;
        let courses_by_id: HashMap<String, Course> =
            courses.into_iter().map(|c| (c.id.clone(), c)).collect();

        let all_rooms = self.rooms.list_active().await?;
        let computer_lab_ids: HashSet<String> =
            self.rooms.list_computer_lab_ids().await?.into_iter().collect();
        let program_history_lab_ids: HashSet<String> = period_records
            .iter()
            .map(|r| r.room_id.clone())
            .filter(|id| computer_lab_ids.contains(id))
            .collect();
        let room_pool = RoomPool {
            rooms: &all_rooms,
            computer_lab_ids: &computer_lab_ids,
            program_history_lab_ids: &program_history_lab_ids,
        };

        let outcomes = match class {
            ProgramClass::Social => {
                place_social(&units, &courses_by_id, &eligible_dates, &mut ledger, &room_pool)
            }
            ProgramClass::HealthLike => {
                place_health_like(&units, &courses_by_id, &eligible_dates, &mut ledger, &room_pool)
            }
        };

        let units_by_key: HashMap<(String, String), &ExamUnit> = units
            .iter()
            .map(|u| ((u.course_id.clone(), u.group_id.clone()), u))
            .collect();

        let active_teachers = self.teachers.list_active().await?;
        let mut jury_permissions_by_course: HashMap<String, Vec<_>> = HashMap::new();

        let mut tx = self.exams.begin().await?;
        clear_scope(
            &self.teaching_records,
            &self.exams,
            &mut tx,
            &request.program_id,
            &resolved.period_id,
            &request.evaluation_id,
        )
        .await?;

        let mut conflicts = Vec::new();
        let mut created_count = 0usize;

        for outcome in outcomes {
            let placed = match outcome {
                PlacementOutcome::Placed(placed) => placed,
                PlacementOutcome::Conflict(conflict) => {
                    conflicts.push(ConflictReport {
                        course_id: conflict.course_id,
                        group_id: conflict.group_id,
                        reason: conflict.reason,
                    });
                    continue;
                }
            };

            let Some(unit) = units_by_key.get(&(placed.course_id.clone(), placed.group_id.clone())) else {
                continue;
            };

            let invigilator = assign_invigilator(&placed, &unit.primary, &active_teachers, &mut ledger);
            let invigilator_teacher_id = match invigilator {
                InvigilatorOutcome::Assigned(teacher_id) => teacher_id,
                InvigilatorOutcome::Conflict(reason) => {
                    conflicts.push(ConflictReport {
                        course_id: placed.course_id.clone(),
                        group_id: placed.group_id.clone(),
                        reason,
                    });
                    continue;
                }
            };

            if !jury_permissions_by_course.contains_key(&placed.course_id) {
                let permissions = self.jury_permissions.list_for_course(&placed.course_id).await?;
                jury_permissions_by_course.insert(placed.course_id.clone(), permissions);
            }
            let permissions = &jury_permissions_by_course[&placed.course_id];
            let jury = assign_jury(
                &placed,
                permissions,
                &unit.primary.teacher_id,
                self.max_jury_load,
                &mut ledger,
            );

            let exam_request_id = synth_id_fresh(
                "EX",
                &[
                    resolved.period_id.as_str(),
                    request.evaluation_id.as_str(),
                    placed.course_id.as_str(),
                    placed.group_id.as_str(),
                ],
            );
            let exam_request = ExamRequest {
                id: exam_request_id.clone(),
                period_id: resolved.period_id.clone(),
                evaluation_id: request.evaluation_id.clone(),
                course_id: placed.course_id.clone(),
                exam_date: placed.exam_date,
                start_time: placed.start_time,
                end_time: placed.end_time,
                status: ExamStatus::Pending,
                rejection_reason: None,
                manually_edited: false,
            };
            self.exams.insert_request_tx(&mut tx, &exam_request).await?;

            let exam_group = ExamGroup {
                id: synth_id_fresh("EG", &[exam_request_id.as_str(), placed.group_id.as_str()]),
                exam_request_id: exam_request_id.clone(),
                group_id: placed.group_id.clone(),
            };
            self.exams.insert_group_tx(&mut tx, &exam_group).await?;

            let room_assignment = RoomAssignment {
                id: synth_id_fresh("AA", &[exam_request_id.as_str(), placed.room_id.as_str()]),
                exam_request_id: exam_request_id.clone(),
                room_id: placed.room_id.clone(),
                invigilator_teacher_id,
            };
            self.exams.insert_room_assignment_tx(&mut tx, &room_assignment).await?;

            if let JuryOutcome::Assigned(teacher_id) = jury {
                let jury_assignment = JuryAssignment {
                    id: synth_id_fresh("ES", &[exam_request_id.as_str(), teacher_id.as_str()]),
                    exam_request_id: exam_request_id.clone(),
                    teacher_id,
                };
                self.exams.insert_jury_assignment_tx(&mut tx, &jury_assignment).await?;
            }

            created_count += 1;
        }

        tx.commit().await.map_err(examcal_storage::StorageError::Query)?;

        if !conflicts.is_empty() {
            warn!(program_id = %request.program_id, conflicts = conflicts.len(), "generation produced conflicts");
        }
        info!(program_id = %request.program_id, created = created_count, "generated exam calendar");

        let mut warnings = Vec::new();
        if matches!(class, ProgramClass::HealthLike) && groups.len() > 1 {
            warnings.push(
                "health-like program: exam positions are shared across groups of the same course"
                    .to_string(),
            );
        }

        Ok(GenerateCalendarResponse {
            created_count,
            conflicts,
            warnings,
            resolved_period_display_name: resolved.display_name,
            resolved_semester_label: resolved.semester_label,
        })
    }
}

fn units_depth(units: &[ExamUnit]) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for unit in units {
        *counts.entry(unit.group_id.as_str()).or_insert(0) += 1;
    }
    counts.values().copied().max().unwrap_or(0)
}

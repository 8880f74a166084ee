//! Slot & Room Picker (SPEC_FULL.md §4.5).

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use examcal_domain::{Course, ExamMode, Room};

use crate::ledger::ReservationLedger;
use crate::workload::ExamUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomTier {
    A,
    B,
    C,
}

/// A successfully placed unit: date, time and room resolved.
#[derive(Debug, Clone)]
pub struct Placed {
    pub course_id: String,
    pub group_id: String,
    pub exam_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub room_id: String,
    pub room_tier: RoomTier,
}

/// A unit the picker could not place, with the reason for the caller's conflict report.
#[derive(Debug, Clone)]
pub struct PlacementConflict {
    pub course_id: String,
    pub group_id: String,
    pub reason: String,
}

pub enum PlacementOutcome {
    Placed(Placed),
    Conflict(PlacementConflict),
}

/// Read-only room context threaded through both scheduling strategies.
pub struct RoomPool<'a> {
    pub rooms: &'a [Room],
    pub computer_lab_ids: &'a HashSet<String>,
    pub program_history_lab_ids: &'a HashSet<String>,
}

fn tier_a_capacity(headcount: i32) -> i32 {
    headcount
}

fn tier_b_capacity(headcount: i32) -> i32 {
    ((headcount as f64) * 0.8).ceil() as i32
}

/// Eligible room ids for `mode`, ordered by preference: for platform exams, rooms with
/// prior program history come first, then other labs; both tiers broken by room id.
fn ordered_candidates<'a>(pool: &'a RoomPool<'a>, mode: ExamMode) -> Vec<&'a Room> {
    let mut candidates: Vec<&Room> = pool
        .rooms
        .iter()
        .filter(|r| !r.disabled)
        .filter(|r| match mode {
            ExamMode::Platform => pool.computer_lab_ids.contains(&r.id),
            ExamMode::Written => true,
        })
        .collect();

    candidates.sort_by(|a, b| {
        let a_preferred = pool.program_history_lab_ids.contains(&a.id);
        let b_preferred = pool.program_history_lab_ids.contains(&b.id);
        b_preferred.cmp(&a_preferred).then(a.id.cmp(&b.id))
    });

    candidates
}

/// Try tiers A, then B, then C, over the mode-eligible candidate pool.
pub fn pick_room(
    pool: &RoomPool,
    ledger: &ReservationLedger,
    mode: ExamMode,
    headcount: i32,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Option<(String, RoomTier)> {
    let candidates = ordered_candidates(pool, mode);

    for (tier, min_capacity) in [
        (RoomTier::A, tier_a_capacity(headcount)),
        (RoomTier::B, tier_b_capacity(headcount)),
        (RoomTier::C, 0),
    ] {
        for room in &candidates {
            if room.capacity < min_capacity {
                continue;
            }
            if ledger.room_is_free(&room.id, date, start, end) {
                return Some((room.id.clone(), tier));
            }
        }
    }
    None
}

/// Social policy: exam time mirrors the class's own time; within a group, the k-th unit
/// (ordered by course id) receives the k-th eligible date.
pub fn place_social(
    units: &[ExamUnit],
    courses: &HashMap<String, Course>,
    eligible_dates: &[NaiveDate],
    ledger: &mut ReservationLedger,
    pool: &RoomPool,
) -> Vec<PlacementOutcome> {
    let mut by_group: HashMap<String, Vec<&ExamUnit>> = HashMap::new();
    for unit in units {
        by_group.entry(unit.group_id.clone()).or_default().push(unit);
    }

    let mut outcomes = Vec::new();
    let mut group_ids: Vec<&String> = by_group.keys().collect();
    group_ids.sort();

    for group_id in group_ids {
        let mut group_units = by_group.remove(group_id).unwrap();
        group_units.sort_by(|a, b| a.course_id.cmp(&b.course_id));

        for (k, unit) in group_units.into_iter().enumerate() {
            let Some(&date) = eligible_dates.get(k) else {
                outcomes.push(PlacementOutcome::Conflict(PlacementConflict {
                    course_id: unit.course_id.clone(),
                    group_id: unit.group_id.clone(),
                    reason: "ran out of eligible dates for this group's exams".to_string(),
                }));
                continue;
            };

            let start = unit.primary.start_time;
            let end = unit.primary.end_time;
            let mode = courses
                .get(&unit.course_id)
                .map(|c| c.exam_mode)
                .unwrap_or_default();

            let resolved = match mode {
                ExamMode::Written if ledger.room_is_free(&unit.primary.room_id, date, start, end) => {
                    Some((unit.primary.room_id.clone(), RoomTier::A))
                }
                _ => pick_room(pool, ledger, mode, unit.headcount, date, start, end),
            };

            match resolved {
                Some((room_id, tier)) => {
                    ledger.reserve_room(&room_id, date, start, end);
                    outcomes.push(PlacementOutcome::Placed(Placed {
                        course_id: unit.course_id.clone(),
                        group_id: unit.group_id.clone(),
                        exam_date: date,
                        start_time: start,
                        end_time: end,
                        room_id,
                        room_tier: tier,
                    }));
                }
                None => outcomes.push(PlacementOutcome::Conflict(PlacementConflict {
                    course_id: unit.course_id.clone(),
                    group_id: unit.group_id.clone(),
                    reason: "no room satisfies capacity or mode constraints".to_string(),
                })),
            }
        }
    }

    outcomes
}

/// Health-like policy: position-based. All groups sharing a course at position `p` sit the
/// exam on the same date and at the same time; each gets its own room.
pub fn place_health_like(
    units: &[ExamUnit],
    courses: &HashMap<String, Course>,
    eligible_dates: &[NaiveDate],
    ledger: &mut ReservationLedger,
    pool: &RoomPool,
) -> Vec<PlacementOutcome> {
    let mut by_group: HashMap<String, Vec<&ExamUnit>> = HashMap::new();
    for unit in units {
        by_group.entry(unit.group_id.clone()).or_default().push(unit);
    }
    for group_units in by_group.values_mut() {
        group_units.sort_by(|a, b| a.course_id.cmp(&b.course_id));
    }

    let max_positions = by_group.values().map(Vec::len).max().unwrap_or(0);
    let mut outcomes = Vec::new();

    for p in 0..max_positions {
        let Some(&date) = eligible_dates.get(p) else {
            // No more dates at all: every unit at or beyond this position conflicts.
            let mut group_ids: Vec<&String> = by_group.keys().collect();
            group_ids.sort();
            for group_id in group_ids {
                if let Some(unit) = by_group.get(group_id).and_then(|units| units.get(p)) {
                    outcomes.push(PlacementOutcome::Conflict(PlacementConflict {
                        course_id: unit.course_id.clone(),
                        group_id: unit.group_id.clone(),
                        reason: "application window exhausted before this position could be scheduled".to_string(),
                    }));
                }
            }
            continue;
        };

        let shared_time = {
            let mut group_ids: Vec<&String> = by_group.keys().collect();
            group_ids.sort();
            group_ids
                .iter()
                .find_map(|gid| by_group.get(*gid).and_then(|units| units.get(p)))
                .map(|unit| (unit.primary.start_time, unit.primary.end_time))
        };

        let Some((start, end)) = shared_time else {
            continue;
        };

        let mut group_ids: Vec<&String> = by_group.keys().collect();
        group_ids.sort();

        for group_id in group_ids {
            let Some(unit) = by_group.get(group_id).and_then(|units| units.get(p)) else {
                continue;
            };

            let mode = courses
                .get(&unit.course_id)
                .map(|c| c.exam_mode)
                .unwrap_or_default();

            let resolved = match mode {
                ExamMode::Written if ledger.room_is_free(&unit.primary.room_id, date, start, end) => {
                    Some((unit.primary.room_id.clone(), RoomTier::A))
                }
                _ => pick_room(pool, ledger, mode, unit.headcount, date, start, end),
            };

            match resolved {
                Some((room_id, tier)) => {
                    ledger.reserve_room(&room_id, date, start, end);
                    outcomes.push(PlacementOutcome::Placed(Placed {
                        course_id: unit.course_id.clone(),
                        group_id: unit.group_id.clone(),
                        exam_date: date,
                        start_time: start,
                        end_time: end,
                        room_id,
                        room_tier: tier,
                    }));
                }
                None => outcomes.push(PlacementOutcome::Conflict(PlacementConflict {
                    course_id: unit.course_id.clone(),
                    group_id: unit.group_id.clone(),
                    reason: "no room satisfies capacity or mode constraints".to_string(),
                })),
            }
        }
    }

    outcomes
}

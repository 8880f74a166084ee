//! Workload Expander (SPEC_FULL.md §4.3): turn teaching records into exam units.

use std::collections::{HashMap, HashSet};

use examcal_domain::{Group, TeachingRecord};

/// One (course, group) pair the scheduler must place an exam for.
#[derive(Debug, Clone)]
pub struct ExamUnit {
    pub course_id: String,
    pub group_id: String,
    pub headcount: i32,
    pub primary: TeachingRecord,
}

fn primary_of<'a>(records: &'a [&'a TeachingRecord]) -> &'a TeachingRecord {
    records
        .iter()
        .min_by_key(|r| (r.day_of_week, r.start_time))
        .expect("records is non-empty by construction")
}

/// Expand a program's teaching schedule into exam units.
///
/// `period_records` are this program's teaching records for the target period.
/// `fallback_records_by_group` supplies, for any group absent from `period_records`, that
/// group's teaching records from any period — used so every group of the program is
/// represented even when the period snapshot is incomplete.
pub fn expand(
    groups: &[Group],
    period_records: &[TeachingRecord],
    fallback_records_by_group: &HashMap<String, Vec<TeachingRecord>>,
) -> Vec<ExamUnit> {
    let groups_with_period_records: HashSet<&str> =
        period_records.iter().map(|r| r.group_id.as_str()).collect();

    let mut by_course_group: HashMap<(String, String), Vec<&TeachingRecord>> = HashMap::new();

    for record in period_records {
        by_course_group
            .entry((record.course_id.clone(), record.group_id.clone()))
            .or_default()
            .push(record);
    }

    for group in groups {
        if groups_with_period_records.contains(group.id.as_str()) {
            continue;
        }
        let Some(fallback) = fallback_records_by_group.get(&group.id) else {
            continue;
        };
        for record in fallback {
            by_course_group
                .entry((record.course_id.clone(), record.group_id.clone()))
                .or_default()
                .push(record);
        }
    }

    let headcount_by_group: HashMap<&str, i32> =
        groups.iter().map(|g| (g.id.as_str(), g.headcount)).collect();

    let mut units: Vec<ExamUnit> = by_course_group
        .into_iter()
        .filter(|(_, records)| !records.is_empty())
        .map(|((course_id, group_id), records)| {
            let primary = primary_of(&records).clone();
            let headcount = *headcount_by_group.get(group_id.as_str()).unwrap_or(&0);
            ExamUnit {
                course_id,
                group_id,
                headcount,
                primary,
            }
        })
        .collect();

    units.sort_by(|a, b| (a.course_id.clone(), a.group_id.clone()).cmp(&(b.course_id.clone(), b.group_id.clone())));
    units
}

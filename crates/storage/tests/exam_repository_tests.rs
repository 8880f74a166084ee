#![cfg(feature = "postgres-tests")]

use chrono::NaiveDate;
use examcal_domain::{ExamGroup, ExamRequest, ExamStatus, JuryAssignment, RoomAssignment};
use examcal_storage::{ExamRepository, WindowRepository};
use sqlx::PgPool;

fn exam_request(id: &str, course_id: &str, status: ExamStatus) -> ExamRequest {
    ExamRequest {
        id: id.to_string(),
        period_id: "per-1".to_string(),
        evaluation_id: "eval-1".to_string(),
        course_id: course_id.to_string(),
        exam_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        status,
        rejection_reason: None,
        manually_edited: false,
    }
}

async fn seed_reference_data(pool: &PgPool) {
    sqlx::query("INSERT INTO programs (id, name) VALUES ('prog-1', 'Medicine')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO academic_periods (id, display_name) VALUES ('per-1', '2026B')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO evaluation_kinds (id, name) VALUES ('eval-1', 'Partial 1')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO courses (id, name, is_academy, exam_mode) VALUES ('course-1', 'Anatomy', false, 'written')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO groups (id, name, headcount, program_id) VALUES ('group-1', 'A', 30, 'prog-1')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO teachers (id, name, disabled) VALUES ('teacher-1', 'Dr. Lopez', false)")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO rooms (id, name, capacity, disabled) VALUES ('room-1', 'A101', 40, false)")
        .execute(pool)
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
async fn exam_requests_scoped_delete_leaves_other_programs_untouched(
    pool: PgPool,
) -> Result<(), sqlx::Error> {
    seed_reference_data(&pool).await;
    let window_repo = WindowRepository::new(pool.clone());
    window_repo
        .create(
            "win-1",
            "per-1",
            "eval-1",
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 22).unwrap(),
        )
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

    sqlx::query("INSERT INTO courses (id, name, is_academy, exam_mode) VALUES ('course-2', 'Other Program Course', false, 'written')")
        .execute(&pool)
        .await?;

    let repo = ExamRepository::new(pool.clone());
    let mut tx = repo
        .begin()
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

    let keep = ExamRequest {
        id: "EX-keep".to_string(),
        period_id: "per-1".to_string(),
        evaluation_id: "eval-1".to_string(),
        course_id: "course-2".to_string(),
        exam_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        status: ExamStatus::Pending,
        rejection_reason: None,
        manually_edited: false,
    };
    let remove = ExamRequest {
        id: "EX-remove".to_string(),
        course_id: "course-1".to_string(),
        ..keep.clone()
    };
    repo.insert_request_tx(&mut tx, &keep)
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    repo.insert_request_tx(&mut tx, &remove)
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    tx.commit().await?;

    let mut tx = repo
        .begin()
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    let deleted = repo
        .delete_scope_tx(&mut tx, "per-1", "eval-1", &["course-1".to_string()])
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    tx.commit().await?;

    assert_eq!(deleted, 1);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exam_requests")
        .fetch_one(&pool)
        .await?;
    assert_eq!(remaining, 1);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn calendar_projection_flags_room_conflict(pool: PgPool) -> Result<(), sqlx::Error> {
    seed_reference_data(&pool).await;
    let repo = ExamRepository::new(pool.clone());
    let mut tx = repo
        .begin()
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

    let request = ExamRequest {
        id: "EX-1".to_string(),
        period_id: "per-1".to_string(),
        evaluation_id: "eval-1".to_string(),
        course_id: "course-1".to_string(),
        exam_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        status: ExamStatus::Pending,
        rejection_reason: None,
        manually_edited: false,
    };
    repo.insert_request_tx(&mut tx, &request)
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    repo.insert_group_tx(
        &mut tx,
        &ExamGroup {
            id: "EG-1".to_string(),
            exam_request_id: "EX-1".to_string(),
            group_id: "group-1".to_string(),
        },
    )
    .await
    .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    repo.insert_room_assignment_tx(
        &mut tx,
        &RoomAssignment {
            id: "AA-1".to_string(),
            exam_request_id: "EX-1".to_string(),
            room_id: "room-1".to_string(),
            invigilator_teacher_id: "teacher-1".to_string(),
        },
    )
    .await
    .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    repo.insert_jury_assignment_tx(
        &mut tx,
        &JuryAssignment {
            id: "ES-1".to_string(),
            exam_request_id: "EX-1".to_string(),
            teacher_id: "teacher-1".to_string(),
        },
    )
    .await
    .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    tx.commit().await?;

    let rows = repo
        .list_calendar_for_program("prog-1")
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].room_conflict);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn overview_groups_status_counts_per_program(pool: PgPool) -> Result<(), sqlx::Error> {
    seed_reference_data(&pool).await;
    let repo = ExamRepository::new(pool.clone());

    let mut tx = repo
        .begin()
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    for (id, status) in [
        ("EX-p", ExamStatus::Pending),
        ("EX-a", ExamStatus::Approved),
        ("EX-r", ExamStatus::Rejected),
    ] {
        repo.insert_request_tx(&mut tx, &exam_request(id, "course-1", status))
            .await
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
        repo.insert_group_tx(
            &mut tx,
            &ExamGroup {
                id: format!("EG-{id}"),
                exam_request_id: id.to_string(),
                group_id: "group-1".to_string(),
            },
        )
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    }
    tx.commit().await?;

    let overview = repo
        .list_overview_by_program()
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].program_id, "prog-1");
    assert_eq!(overview[0].pending_count, 1);
    assert_eq!(overview[0].approved_count, 1);
    assert_eq!(overview[0].rejected_count, 1);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn count_requests_for_program_reflects_existence(pool: PgPool) -> Result<(), sqlx::Error> {
    seed_reference_data(&pool).await;
    let repo = ExamRepository::new(pool.clone());

    let before = repo
        .count_requests_for_program("prog-1")
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    assert_eq!(before, 0);

    let mut tx = repo
        .begin()
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    repo.insert_request_tx(&mut tx, &exam_request("EX-1", "course-1", ExamStatus::Pending))
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    repo.insert_group_tx(
        &mut tx,
        &ExamGroup {
            id: "EG-1".to_string(),
            exam_request_id: "EX-1".to_string(),
            group_id: "group-1".to_string(),
        },
    )
    .await
    .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    tx.commit().await?;

    let after = repo
        .count_requests_for_program("prog-1")
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    assert_eq!(after, 1);

    let other = repo
        .count_requests_for_program("prog-unknown")
        .await
        .map_err(|e| sqlx::Error::Protocol(e.to_string()))?;
    assert_eq!(other, 0);

    Ok(())
}

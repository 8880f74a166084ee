#![cfg(feature = "postgres-tests")]

use std::{sync::Arc, time::Instant};

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use examcal_api::{AppState, build_router};
use examcal_config::AppConfig;
use examcal_domain::{Claims, Role};
use examcal_engine::GenerationService;
use examcal_storage::{
    CourseRepository, ExamRepository, GroupRepository, JuryPermissionRepository,
    PeriodRepository, ProgramRepository, RoomRepository, TeacherRepository,
    TeachingRecordRepository, WindowRepository,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;

const JWT_SECRET: &str = "test-secret";

fn test_state(pool: PgPool) -> Arc<AppState> {
    let generation_service = GenerationService::new(
        PeriodRepository::new(pool.clone()),
        ProgramRepository::new(pool.clone()),
        GroupRepository::new(pool.clone()),
        TeachingRecordRepository::new(pool.clone()),
        CourseRepository::new(pool.clone()),
        TeacherRepository::new(pool.clone()),
        RoomRepository::new(pool.clone()),
        JuryPermissionRepository::new(pool.clone()),
        WindowRepository::new(pool.clone()),
        ExamRepository::new(pool.clone()),
        21,
        3,
    );

    Arc::new(AppState {
        pool: pool.clone(),
        generation_service,
        exam_repo: ExamRepository::new(pool),
        config: AppConfig {
            database_url: "postgres://unused".to_string(),
            jwt_secret: JWT_SECRET.to_string(),
            cors_origins: vec![],
            admin_reset_key: String::new(),
            bind_address: "127.0.0.1:0".to_string(),
            base_url: "http://localhost:8080".to_string(),
            exam_window_default_days: 21,
            exam_max_jury_load: 3,
        },
        start_time: Instant::now(),
    })
}

fn auth_header(role: Role) -> String {
    let now = 1_700_000_000u64;
    let token = encode(
        &Header::default(),
        &Claims {
            sub: "registrar-1".to_string(),
            role,
            exp: now + 3600,
            iat: now,
        },
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();

    format!("Bearer {token}")
}

async fn seed_minimal_fixture(pool: &PgPool) {
    sqlx::query("INSERT INTO academic_periods (id, display_name) VALUES ('period-1', 'Fall 2026')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO evaluation_kinds (id, name) VALUES ('eval-1', 'Ordinary')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO programs (id, name) VALUES ('prog-1', 'Business Administration')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO groups (id, name, headcount, program_id) VALUES ('group-1', 'A', 30, 'prog-1')",
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO courses (id, name, is_academy, exam_mode) VALUES ('course-1', 'Accounting I', false, 'written')",
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO teachers (id, name, disabled) VALUES ('teacher-1', 'Dr. Rivas', false)")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO rooms (id, name, capacity, disabled) VALUES ('room-1', 'A101', 40, false)")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO teaching_records (id, period_id, course_id, group_id, teacher_id, room_id, day_of_week, start_time, end_time)
         VALUES ('tr-1', 'period-1', 'course-1', 'group-1', 'teacher-1', 'room-1', 1, '08:00', '10:00')",
    )
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../migrations")]
async fn generate_then_list_then_approve(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    seed_minimal_fixture(&pool).await;
    let app = build_router(test_state(pool.clone()));

    let unauthorized = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/calendar/generate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json!({
                    "program_id": "prog-1",
                    "start_date": "2026-12-01",
                    "evaluation_id": "eval-1",
                }))?))?,
        )
        .await?;
    assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);

    let generate_resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/calendar/generate")
                .header(header::AUTHORIZATION, auth_header(Role::SchoolServices))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json!({
                    "program_id": "prog-1",
                    "start_date": "2026-12-01",
                    "evaluation_id": "eval-1",
                }))?))?,
        )
        .await?;
    assert_eq!(generate_resp.status(), StatusCode::OK);
    let generate_body: Value =
        serde_json::from_slice(&to_bytes(generate_resp.into_body(), 1024 * 1024).await?)?;
    assert_eq!(generate_body["created_count"], 1);
    assert_eq!(generate_body["conflicts"].as_array().unwrap().len(), 0);

    let calendar_resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/programs/prog-1/calendar")
                .header(header::AUTHORIZATION, auth_header(Role::Registrar))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(calendar_resp.status(), StatusCode::OK);
    let calendar_body: Value =
        serde_json::from_slice(&to_bytes(calendar_resp.into_body(), 1024 * 1024).await?)?;
    let rows = calendar_body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["course_id"], "course-1");
    assert_eq!(rows[0]["status"], "pending");

    let approve_resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/calendar/bulk-approve")
                .header(header::AUTHORIZATION, auth_header(Role::Registrar))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json!({
                    "program_id": "prog-1",
                    "period_id": "period-1",
                    "evaluation_id": "eval-1",
                }))?))?,
        )
        .await?;
    assert_eq!(approve_resp.status(), StatusCode::OK);
    let approve_body: Value =
        serde_json::from_slice(&to_bytes(approve_resp.into_body(), 1024 * 1024).await?)?;
    assert_eq!(approve_body["affected_count"], 1);

    let overview_resp = app
        .oneshot(
            Request::builder()
                .uri("/v1/calendar/overview")
                .header(header::AUTHORIZATION, auth_header(Role::Registrar))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(overview_resp.status(), StatusCode::OK);
    let overview_body: Value =
        serde_json::from_slice(&to_bytes(overview_resp.into_body(), 1024 * 1024).await?)?;
    let programs = overview_body["programs"].as_array().unwrap();
    let prog1 = programs
        .iter()
        .find(|p| p["program_id"] == "prog-1")
        .expect("prog-1 present in overview");
    assert_eq!(prog1["approved_count"], 1);
    assert_eq!(prog1["pending_count"], 0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn generate_rejects_invalid_body(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(test_state(pool));

    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/calendar/generate")
                .header(header::AUTHORIZATION, auth_header(Role::SchoolServices))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json!({
                    "program_id": "",
                    "start_date": "2026-12-01",
                    "evaluation_id": "eval-1",
                }))?))?,
        )
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn regeneration_is_scoped_to_its_own_program(
    pool: PgPool,
) -> Result<(), Box<dyn std::error::Error>> {
    seed_minimal_fixture(&pool).await;

    sqlx::query("INSERT INTO programs (id, name) VALUES ('prog-2', 'Nursing')")
        .execute(&pool)
        .await?;
    sqlx::query(
        "INSERT INTO groups (id, name, headcount, program_id) VALUES ('group-2', 'A', 25, 'prog-2')",
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        "INSERT INTO courses (id, name, is_academy, exam_mode) VALUES ('course-2', 'Anatomy', false, 'written')",
    )
    .execute(&pool)
    .await?;
    sqlx::query("INSERT INTO teachers (id, name, disabled) VALUES ('teacher-2', 'Dr. Soto', false)")
        .execute(&pool)
        .await?;
    sqlx::query("INSERT INTO rooms (id, name, capacity, disabled) VALUES ('room-2', 'A102', 40, false)")
        .execute(&pool)
        .await?;
    sqlx::query(
        "INSERT INTO teaching_records (id, period_id, course_id, group_id, teacher_id, room_id, day_of_week, start_time, end_time)
         VALUES ('tr-2', 'period-1', 'course-2', 'group-2', 'teacher-2', 'room-2', 2, '08:00', '10:00')",
    )
    .execute(&pool)
    .await?;

    let app = build_router(test_state(pool.clone()));

    async fn generate_for(
        app: axum::Router,
        program_id: &str,
    ) -> Result<StatusCode, Box<dyn std::error::Error>> {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/calendar/generate")
                    .header(header::AUTHORIZATION, auth_header(Role::SchoolServices))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&json!({
                        "program_id": program_id,
                        "start_date": "2026-12-01",
                        "evaluation_id": "eval-1",
                    }))?))?,
            )
            .await?;
        Ok(resp.status())
    }

    assert_eq!(generate_for(app.clone(), "prog-1").await?, StatusCode::OK);
    assert_eq!(generate_for(app.clone(), "prog-2").await?, StatusCode::OK);

    let before: (String,) =
        sqlx::query_as("SELECT id FROM exam_requests WHERE course_id = 'course-2'")
            .fetch_one(&pool)
            .await?;

    // Regenerate prog-1 only; prog-2's request must survive untouched.
    assert_eq!(generate_for(app.clone(), "prog-1").await?, StatusCode::OK);

    let after: (String,) =
        sqlx::query_as("SELECT id FROM exam_requests WHERE course_id = 'course-2'")
            .fetch_one(&pool)
            .await?;
    assert_eq!(before.0, after.0);

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM exam_requests")
        .fetch_one(&pool)
        .await?;
    assert_eq!(total.0, 2);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn calendar_exists_reflects_generation_history(
    pool: PgPool,
) -> Result<(), Box<dyn std::error::Error>> {
    seed_minimal_fixture(&pool).await;
    let app = build_router(test_state(pool.clone()));

    let before = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/v1/programs/prog-1/calendar/exists")
                .header(header::AUTHORIZATION, auth_header(Role::Registrar))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(before.status(), StatusCode::OK);
    let before_body: Value =
        serde_json::from_slice(&to_bytes(before.into_body(), 1024 * 1024).await?)?;
    assert_eq!(before_body["exists"], false);
    assert_eq!(before_body["total_requests"], 0);

    let generate_resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/calendar/generate")
                .header(header::AUTHORIZATION, auth_header(Role::SchoolServices))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json!({
                    "program_id": "prog-1",
                    "start_date": "2026-12-01",
                    "evaluation_id": "eval-1",
                }))?))?,
        )
        .await?;
    assert_eq!(generate_resp.status(), StatusCode::OK);

    let after = app
        .oneshot(
            Request::builder()
                .uri("/v1/programs/prog-1/calendar/exists")
                .header(header::AUTHORIZATION, auth_header(Role::Registrar))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(after.status(), StatusCode::OK);
    let after_body: Value =
        serde_json::from_slice(&to_bytes(after.into_body(), 1024 * 1024).await?)?;
    assert_eq!(after_body["exists"], true);
    assert_eq!(after_body["total_requests"], 1);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_and_ready_are_public(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(test_state(pool));

    let health_resp = app
        .clone()
        .oneshot(Request::builder().uri("/v1/health").body(Body::empty())?)
        .await?;
    assert_eq!(health_resp.status(), StatusCode::OK);

    let ready_resp = app
        .oneshot(Request::builder().uri("/v1/ready").body(Body::empty())?)
        .await?;
    assert_eq!(ready_resp.status(), StatusCode::OK);

    Ok(())
}

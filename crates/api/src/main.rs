//! Examination Calendar Scheduler server.

use std::sync::Arc;
use std::time::Instant;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use examcal_api::{AppState, build_router};
use examcal_config::AppConfig;
use examcal_engine::GenerationService;
use examcal_storage::{
    CourseRepository, ExamRepository, GroupRepository, JuryPermissionRepository,
    PeriodRepository, ProgramRepository, RoomRepository, TeacherRepository,
    TeachingRecordRepository, WindowRepository, create_pool, run_migrations,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Examination Calendar Scheduler...");

    let config = AppConfig::from_env()?;
    tracing::info!("Binding to {}", config.bind_address);

    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let periods = PeriodRepository::new(pool.clone());
    let programs = ProgramRepository::new(pool.clone());
    let groups = GroupRepository::new(pool.clone());
    let teaching_records = TeachingRecordRepository::new(pool.clone());
    let courses = CourseRepository::new(pool.clone());
    let teachers = TeacherRepository::new(pool.clone());
    let rooms = RoomRepository::new(pool.clone());
    let jury_permissions = JuryPermissionRepository::new(pool.clone());
    let windows = WindowRepository::new(pool.clone());
    let exam_repo = ExamRepository::new(pool.clone());

    let generation_service = GenerationService::new(
        periods,
        programs,
        groups,
        teaching_records,
        courses,
        teachers,
        rooms,
        jury_permissions,
        windows,
        exam_repo.clone(),
        config.exam_window_default_days,
        config.exam_max_jury_load,
    );

    let state = Arc::new(AppState {
        pool,
        generation_service,
        exam_repo,
        config: config.clone(),
        start_time: Instant::now(),
    });

    let app = build_router(state);

    // TODO: Add rate limiting middleware (tower_governor or alternative)
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!("Server listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}

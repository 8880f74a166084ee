//! Examination calendar scheduler HTTP API.

pub mod handlers;
pub mod middleware;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use examcal_config::AppConfig;
use examcal_domain::{HealthResponse, ReadyResponse};
use examcal_engine::GenerationService;
use examcal_storage::{ExamRepository, check_connection};
use sqlx::PgPool;

use handlers::calendar::{
    generate_calendar, get_calendar, get_calendar_exists, get_calendar_overview,
};
use handlers::workflow::{bulk_approve, bulk_reject, submit};

/// Application state shared across handlers.
pub struct AppState {
    pub pool: PgPool,
    pub generation_service: GenerationService,
    pub exam_repo: ExamRepository,
    pub config: AppConfig,
    pub start_time: Instant,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/ready", get(ready))
        .route("/v1/calendar/generate", post(generate_calendar))
        .route("/v1/calendar/overview", get(get_calendar_overview))
        .route("/v1/calendar/submit", post(submit))
        .route("/v1/calendar/bulk-approve", post(bulk_approve))
        .route("/v1/calendar/bulk-reject", post(bulk_reject))
        .route("/v1/programs/{program_id}/calendar", get(get_calendar))
        .route(
            "/v1/programs/{program_id}/calendar/exists",
            get(get_calendar_exists),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Permissive when no origins are configured (local/dev); otherwise restricted to the
/// configured allow-list.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new().allow_origin(AllowOrigin::list(allowed))
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build_sha: option_env!("BUILD_SHA").unwrap_or("dev").to_string(),
        uptime_seconds: uptime,
    })
}

/// Readiness check endpoint.
async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    let db_status = match check_connection(&state.pool).await {
        Ok(()) => "connected",
        Err(_) => "disconnected",
    };

    Json(ReadyResponse {
        status: if db_status == "connected" {
            "ok"
        } else {
            "degraded"
        }
        .to_string(),
        database: db_status.to_string(),
    })
}

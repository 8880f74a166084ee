//! Configuration for the examination calendar scheduler.

use serde::Deserialize;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection URL, composed from `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`.
    pub database_url: String,
    /// JWT secret for token signing/verification
    pub jwt_secret: String,
    /// Allowed CORS origins, comma-separated
    pub cors_origins: Vec<String>,
    /// Shared key gating the admin reset endpoint. Empty disables it.
    pub admin_reset_key: String,
    /// Address to bind the server to
    pub bind_address: String,
    /// Base URL for the API
    pub base_url: String,
    /// Default span, in days, of a freshly created application window
    pub exam_window_default_days: u64,
    /// Maximum number of exams a single teacher may be assigned as jury within one generation run
    pub exam_max_jury_load: usize,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: database_url_from_parts()?,
            jwt_secret: env_var("JWT_SECRET")?,
            cors_origins: env_var_or("CORS_ORIGINS", "")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            admin_reset_key: env_var_or("ADMIN_RESET_KEY", ""),
            bind_address: env_var_or("BIND_ADDRESS", "0.0.0.0:8080"),
            base_url: env_var_or("BASE_URL", "http://localhost:8080"),
            exam_window_default_days: env_var_parsed_or("EXAM_WINDOW_DEFAULT_DAYS", 21)?,
            exam_max_jury_load: env_var_parsed_or("EXAM_MAX_JURY_LOAD", 3)?,
        })
    }
}

fn database_url_from_parts() -> Result<String, ConfigError> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Ok(url);
    }

    let host = env_var("DB_HOST")?;
    let port = env_var_or("DB_PORT", "5432");
    let user = env_var("DB_USER")?;
    let password = env_var("DB_PASSWORD")?;
    let name = env_var("DB_NAME")?;
    Ok(format!("postgres://{user}:{password}@{host}:{port}/{name}"))
}

fn env_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn env_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_var_parsed_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

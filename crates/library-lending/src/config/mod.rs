use std::env;
use std::fmt;

use crate::lending::LendingPolicy;

/// Distinguishes runtime behavior for different stages of the deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    /// Log filter used when neither `APP_LOG_LEVEL` nor `RUST_LOG` is set.
    pub fn default_log_level(self) -> &'static str {
        match self {
            Self::Development => "debug",
            Self::Test => "warn",
            Self::Production => "info",
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub policy: LendingPolicy,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );
        let log_level = env::var("APP_LOG_LEVEL")
            .unwrap_or_else(|_| environment.default_log_level().to_string());

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            policy: load_policy()?,
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn load_policy() -> Result<LendingPolicy, ConfigError> {
    let defaults = LendingPolicy::default();

    Ok(LendingPolicy {
        max_loans_per_period: threshold(
            "LENDING_MAX_LOANS_PER_PERIOD",
            defaults.max_loans_per_period,
        )?,
        max_books_per_request: threshold(
            "LENDING_MAX_BOOKS_PER_REQUEST",
            defaults.max_books_per_request,
        )?,
        max_books_per_topic: threshold(
            "LENDING_MAX_BOOKS_PER_TOPIC",
            defaults.max_books_per_topic,
        )?,
        max_loans_per_day: threshold("LENDING_MAX_LOANS_PER_DAY", defaults.max_loans_per_day)?,
        max_extensions: threshold("LENDING_MAX_EXTENSIONS", defaults.max_extensions)?,
        cooldown_days: threshold("LENDING_COOLDOWN_DAYS", defaults.cooldown_days)?,
        period_days: threshold("LENDING_PERIOD_DAYS", defaults.period_days)?,
        topic_window_months: threshold(
            "LENDING_TOPIC_WINDOW_MONTHS",
            defaults.topic_window_months,
        )?,
        librarian_max_loans_per_day: threshold(
            "LENDING_LIBRARIAN_MAX_LOANS_PER_DAY",
            defaults.librarian_max_loans_per_day,
        )?,
    })
}

fn threshold(key: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidThreshold { key, value }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidThreshold { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidThreshold { key, value } => {
                write!(f, "{key} must be a non-negative integer (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

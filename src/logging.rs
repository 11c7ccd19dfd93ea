//! # Structured Logging
//!
//! Environment-aware tracing initialization. Production emits JSON for log
//! shipping; every other environment gets a readable console layer. Callers
//! may initialize their own subscriber first; this module never panics when
//! one is already installed.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = environment();
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level(&environment)));

        let result = if environment == "production" {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(true))
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true))
                .try_init()
        };

        if result.is_err() {
            tracing::debug!("global tracing subscriber already initialized, continuing");
        }

        tracing::info!(environment = %environment, "logging initialized");
    });
}

/// Current environment from `WRISTPASS_ENV`, falling back to `APP_ENV`.
pub fn environment() -> String {
    std::env::var("WRISTPASS_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

fn default_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

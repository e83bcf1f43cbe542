// Monitoring with Sentry integration
use std::env;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct MonitoringConfig {
    pub sentry_dsn: Option<String>,
    pub environment: String,
    pub traces_sample_rate: f32,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            sentry_dsn: None,
            environment: "production".to_string(),
            traces_sample_rate: 0.0,
        }
    }
}

impl MonitoringConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// `SENTRY_DSN`, `ENVIRONMENT` and `SENTRY_TRACES_SAMPLE_RATE`
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let sentry_dsn = lookup("SENTRY_DSN")
            .map(|dsn| dsn.trim().to_string())
            .filter(|dsn| !dsn.is_empty());
        let environment = lookup("ENVIRONMENT")
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or(defaults.environment);
        let traces_sample_rate = lookup("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|rate| rate.trim().parse::<f32>().ok())
            .filter(|rate| (0.0..=1.0).contains(rate))
            .unwrap_or(defaults.traces_sample_rate);

        Self {
            sentry_dsn,
            environment,
            traces_sample_rate,
        }
    }
}

/// Initialize the Sentry client. The returned guard flushes pending events on
/// drop, so hold it for the life of the process.
pub fn init_sentry(config: &MonitoringConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_deref()?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.environment.clone().into()),
            traces_sample_rate: config.traces_sample_rate,
            ..Default::default()
        },
    ));

    if guard.is_enabled() {
        info!(environment = %config.environment, "Sentry initialized successfully");
    }

    Some(guard)
}

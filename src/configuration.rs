use crate::health::{Presence, RetryPolicy};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app_host: String,
    pub app_port: u16,
    pub health: HealthSettings,
    pub database: Option<DatabaseSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_host: "127.0.0.1".to_string(),
            app_port: 8000,
            health: HealthSettings::default(),
            database: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    /// Deadline for one readiness/health request.
    pub check_timeout_ms: u64,
    pub liveness_path: String,
    pub readiness_path: String,
    pub health_path: String,
    pub retry: RetrySettings,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            check_timeout_ms: 1000,
            liveness_path: "/liveness".to_string(),
            readiness_path: "/readiness".to_string(),
            health_path: "/health".to_string(),
            retry: RetrySettings::default(),
        }
    }
}

impl HealthSettings {
    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
            multiplier: policy.multiplier,
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        RetryPolicy {
            max_attempts: settings.max_attempts,
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
            multiplier: settings.multiplier,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
    /// An unreachable required database takes the service out of rotation.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl DatabaseSettings {
    // Connection string: postgresql://<username>:<password>@<host>:<port>/<database_name>
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name,
        )
    }

    pub fn presence(&self) -> Presence {
        if self.required {
            Presence::Required
        } else {
            Presence::Optional
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // `configuration.{yaml,toml,json}` is optional, APP_HEALTH__CHECK_TIMEOUT_MS=500 style
    // variables override it
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}

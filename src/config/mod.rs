//! Application configuration
//!
//! Loaded from environment variables with the `GYMDESK` prefix; nested
//! values use `__` as the separator (`GYMDESK__DATABASE__URL`,
//! `GYMDESK__POLICY__MIN_DWELL_MINUTES`). A `.env` file is read first if
//! present.
//!
//! ```no_run
//! use gymdesk::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod email;
mod error;
mod policy;
mod redis;
mod runtime;

pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use policy::PolicyConfig;
pub use redis::RedisConfig;
pub use runtime::{Environment, LogFormat};

use serde::Deserialize;

/// Root configuration for the sweep runner and adapters.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    pub database: DatabaseConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    /// Realtime fan-out; events are only logged when absent.
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    /// Email copies of notices; in-app only when absent.
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

impl AppConfig {
    /// Load configuration from `.env` and the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or a value
    /// cannot be parsed into its field type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GYMDESK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation of every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        tracing_subscriber::EnvFilter::try_new(&self.log_level)
            .map_err(|_| ValidationError::InvalidLogLevel(self.log_level.clone()))?;
        self.database.validate()?;
        self.policy.validate()?;
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        if let Some(email) = &self.email {
            email.validate()?;
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; serialize the tests that touch them.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "GYMDESK__DATABASE__URL",
        "GYMDESK__POLICY__MIN_DWELL_MINUTES",
        "GYMDESK__POLICY__UTC_OFFSET_MINUTES",
        "GYMDESK__REDIS__URL",
        "GYMDESK__EMAIL__RESEND_API_KEY",
        "GYMDESK__ENVIRONMENT",
        "GYMDESK__LOG_FORMAT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        clear_env();
        env::set_var("GYMDESK__DATABASE__URL", "postgres://gym@localhost/gym");
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn minimal_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[]).unwrap();

        assert_eq!(config.database.url, "postgres://gym@localhost/gym");
        assert_eq!(config.policy.min_dwell_minutes, 30);
        assert_eq!(config.policy.expiring_soon_days, 3);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.redis.is_none());
        assert!(config.email.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn policy_overrides_are_read() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("GYMDESK__POLICY__MIN_DWELL_MINUTES", "45"),
            ("GYMDESK__POLICY__UTC_OFFSET_MINUTES", "480"),
        ])
        .unwrap();

        assert_eq!(config.policy.min_dwell_minutes, 45);
        assert_eq!(config.policy.utc_offset_minutes, 480);
    }

    #[test]
    fn optional_sections_appear_when_configured() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("GYMDESK__REDIS__URL", "redis://localhost:6379"),
            ("GYMDESK__EMAIL__RESEND_API_KEY", "re_test"),
        ])
        .unwrap();

        assert_eq!(config.redis.as_ref().unwrap().channel_prefix, "gymdesk");
        assert_eq!(config.email.as_ref().unwrap().resend_api_key, "re_test");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn production_with_json_logs() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[
            ("GYMDESK__ENVIRONMENT", "production"),
            ("GYMDESK__LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn bad_email_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let config = load_with(&[("GYMDESK__EMAIL__RESEND_API_KEY", "sk_wrong")]).unwrap();

        assert!(matches!(config.validate(), Err(ValidationError::InvalidResendKey)));
    }
}

//! Application configuration loaded from environment variables.
//!
//! Secrets are injected as environment variables by the deployment
//! (Cloud Run secret bindings), so no Secret Manager round-trips are
//! needed at startup.

use std::env;

/// Queue name expected on scheduled maintenance requests.
///
/// Cloud Run strips the `x-cloudtasks-queuename` header from external
/// requests, so a matching value guarantees internal origin.
pub const SWEEP_QUEUE_NAME: &str = "streak-maintenance";

/// Default length of the streak grace window, in days.
pub const DEFAULT_GRACE_DAYS: u32 = 3;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Days a streak survives without a logged action
    pub streak_grace_days: u32,

    // --- Secrets (injected via env) ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let streak_grace_days = env::var("STREAK_GRACE_DAYS")
            .unwrap_or_else(|_| DEFAULT_GRACE_DAYS.to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("STREAK_GRACE_DAYS"))?;
        if streak_grace_days == 0 {
            return Err(ConfigError::Invalid("STREAK_GRACE_DAYS"));
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            streak_grace_days,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            streak_grace_days: DEFAULT_GRACE_DAYS,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that mutate process-global env vars so they don't race.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_config_from_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::remove_var("STREAK_GRACE_DAYS");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 8080);
        assert_eq!(config.streak_grace_days, DEFAULT_GRACE_DAYS);
    }

    #[test]
    fn test_config_rejects_zero_grace_window() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("STREAK_GRACE_DAYS", "0");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("STREAK_GRACE_DAYS")));

        env::remove_var("STREAK_GRACE_DAYS");
    }
}

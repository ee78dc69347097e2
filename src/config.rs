//! Environment-backed configuration, in place of the literals the teacher
//! hardcodes in `start_server`.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub prompt_timeout: Duration,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("KARATA_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let database_url =
            std::env::var("KARATA_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
        let prompt_timeout_secs = std::env::var("KARATA_PROMPT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);
        let jwt_secret = std::env::var("KARATA_JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("KARATA_JWT_SECRET not set, falling back to a dev-only fixed secret");
            "karata-dev-only-secret-do-not-use-in-production".to_string()
        });

        Self {
            bind_addr,
            database_url,
            prompt_timeout: Duration::from_secs(prompt_timeout_secs),
            jwt_secret,
        }
    }
}

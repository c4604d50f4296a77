//! Server configuration, read from the environment.

use referra_core::constants::{DEFAULT_REFERRAL_TTL_DAYS, DEFAULT_REWARD_TTL_DAYS};

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    /// Directory the SQLite database lives in (unless DATABASE_URL is set).
    pub app_data_dir: String,
    /// Public origin used to build share links.
    pub base_url: String,
    /// HMAC secret for verifying bearer tokens issued by the identity
    /// provider.
    pub jwt_secret: String,
    pub referral_ttl_days: i64,
    pub reward_ttl_days: i64,
    /// How often the expiry sweep runs.
    pub expiry_sweep_minutes: u64,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            listen_addr: env_or("LISTEN_ADDR", "0.0.0.0:8080"),
            app_data_dir: env_or("APP_DATA_DIR", "./data"),
            base_url: env_or("BASE_URL", "http://localhost:8080"),
            jwt_secret: env_or("JWT_SECRET", "dev-secret-change-me"),
            referral_ttl_days: env_parse_or("REFERRAL_TTL_DAYS", DEFAULT_REFERRAL_TTL_DAYS),
            reward_ttl_days: env_parse_or("REWARD_TTL_DAYS", DEFAULT_REWARD_TTL_DAYS),
            expiry_sweep_minutes: env_parse_or("EXPIRY_SWEEP_MINUTES", 15),
        }
    }
}

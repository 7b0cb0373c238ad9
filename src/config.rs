use crate::auth::DEFAULT_ADMIN_PASSWORD;
use crate::error::{CafeError, Result};
use crate::tables::DEFAULT_KEY_PREFIX;
use std::path::PathBuf;
use std::{env, fmt::Display, str::FromStr, time::Duration};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub admin_password: String,
    pub poll_interval: Duration,
    pub key_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from("cafe_desk.db"),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            poll_interval: Duration::from_millis(2000),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(|key| env::var(key).ok())
    }

    /// `lookup` stands in for the environment.
    pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let poll_ms: u64 = try_load(&lookup, "CAFE_POLL_INTERVAL_MS", "2000")?;
        if poll_ms == 0 {
            return Err(CafeError::Config("CAFE_POLL_INTERVAL_MS must be positive".into()));
        }

        Ok(Config {
            db_path: try_load(&lookup, "CAFE_DB_PATH", &defaults.db_path.to_string_lossy())?,
            admin_password: secret(&lookup, "CAFE_ADMIN_PASSWORD", &defaults.admin_password),
            poll_interval: Duration::from_millis(poll_ms),
            key_prefix: try_load(&lookup, "CAFE_KEY_PREFIX", &defaults.key_prefix)?,
        })
    }
}

fn try_load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            CafeError::Config(format!("invalid {key}: {e}"))
        })
}

fn secret(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| {
        warn!("{key} not set, using the built-in default");
        default.to_string()
    })
}

use std::{env, fmt::Display, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use infra::RegistrationConfig;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub db_max_connections: u32,
    pub registration: RegistrationConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            port: try_load(&lookup, "PORT", "8080")?,
            db_max_connections: try_load(&lookup, "DB_MAX_CONNECTIONS", "10")?,
            registration: RegistrationConfig {
                receipt_prefix: try_load(&lookup, "RECEIPT_PREFIX", "VEYG")?,
                store_timeout: Duration::from_millis(try_load(&lookup, "STORE_TIMEOUT_MS", "5000")?),
                collision_attempts: try_load(&lookup, "ID_COLLISION_ATTEMPTS", "5")?,
            },
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: &str) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse()
        .map_err(|e| anyhow!("invalid {key} value {raw:?}: {e}"))
}

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Postgres,
    Memory,
}

impl std::str::FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(BackendKind::Postgres),
            "memory" => Ok(BackendKind::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub backend: BackendKind,
    /// Present whenever `backend` is `Postgres`.
    pub database: Option<DbConfig>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match get("STORE_BACKEND") {
            Some(v) => v.parse()?,
            None => BackendKind::Postgres,
        };

        let database = match backend {
            BackendKind::Postgres => {
                let url = get("DATABASE_URL")
                    .filter(|v| !v.trim().is_empty())
                    .ok_or(ConfigError::Missing("DATABASE_URL"))?;
                Some(DbConfig {
                    url,
                    max_connections: get("DB_POOL_MAX")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(10),
                    acquire_timeout_secs: get("DB_ACQUIRE_TIMEOUT_SECS")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(5),
                })
            }
            BackendKind::Memory => None,
        };

        Ok(Self {
            backend,
            database,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: get("APP_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }

    pub fn memory() -> Self {
        Self {
            backend: BackendKind::Memory,
            database: None,
            host: "127.0.0.1".into(),
            port: 0,
        }
    }
}

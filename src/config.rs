use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::services::forecast_service::SubmissionPolicy;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub store: StoreBackend,
    /// Present whenever `store` is `Postgres`.
    pub database: Option<DatabaseConfig>,
    pub bind_addr: SocketAddr,
    pub submission: SubmissionPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = parse_or(&lookup, "STORE_BACKEND", StoreBackend::Postgres)?;

        let database = match store {
            StoreBackend::Postgres => {
                let url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
                let max_connections: u32 = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;
                if max_connections == 0 {
                    return Err(ConfigError::Invalid {
                        key: "DATABASE_MAX_CONNECTIONS",
                        value: "0".to_string(),
                    });
                }
                let acquire_timeout_secs: u64 =
                    parse_or(&lookup, "DATABASE_ACQUIRE_TIMEOUT_SECS", 30)?;
                Some(DatabaseConfig {
                    url,
                    max_connections,
                    acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                })
            }
            StoreBackend::Memory => None,
        };

        let bind_addr = parse_or(
            &lookup,
            "BIND_ADDR",
            SocketAddr::from(([0, 0, 0, 0], 3000)),
        )?;

        let min_years: usize = parse_or(&lookup, "FORECAST_MIN_YEARS", 1)?;
        let max_years: Option<usize> = parse_opt(&lookup, "FORECAST_MAX_YEARS")?;
        if min_years == 0 {
            return Err(ConfigError::Invalid {
                key: "FORECAST_MIN_YEARS",
                value: "0".to_string(),
            });
        }
        if max_years.is_some_and(|max| max < min_years) {
            return Err(ConfigError::Invalid {
                key: "FORECAST_MAX_YEARS",
                value: format!("{:?} (min {})", max_years, min_years),
            });
        }
        let require_contiguous_years =
            parse_or(&lookup, "FORECAST_REQUIRE_CONTIGUOUS_YEARS", true)?;

        Ok(Self {
            store,
            database,
            bind_addr,
            submission: SubmissionPolicy {
                min_years,
                max_years,
                require_contiguous_years,
            },
        })
    }
}

fn parse_opt<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}

//! Runtime configuration loaded from the process environment.

use std::path::PathBuf;

/// Default request body limit for uploads: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl core::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            _ => Err(ConfigError::Invalid {
                key: "APP_ENV",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    /// Postgres connection string. `None` selects in-memory repositories.
    pub database_url: Option<String>,
    pub cors_origin: String,
    /// Public base URL used to build download links.
    pub api_base_url: String,
    pub log_level: String,
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            port: 3000,
            database_url: None,
            cors_origin: "http://localhost:3001".to_string(),
            api_base_url: "http://localhost:3000".to_string(),
            log_level: "info".to_string(),
            uploads_dir: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl AppConfig {
    /// Load from the environment, reading `.env` first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let environment = match get("APP_ENV").or_else(|| get("NODE_ENV")) {
            Some(raw) => raw.parse()?,
            None => defaults.environment,
        };

        let port = match get("PORT") {
            Some(raw) => parse_number("PORT", &raw)?,
            None => defaults.port,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(raw) => parse_number("MAX_UPLOAD_BYTES", &raw)?,
            None => defaults.max_upload_bytes,
        };

        Ok(Self {
            environment,
            port,
            database_url: get("DATABASE_URL"),
            cors_origin: get("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            api_base_url: get("API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            log_level: get("LOG_LEVEL").unwrap_or(defaults.log_level),
            uploads_dir: get("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.uploads_dir),
            max_upload_bytes,
        })
    }

    /// Verbose diagnostics (full error chains in logs) outside production.
    pub fn verbose_diagnostics(&self) -> bool {
        !self.environment.is_production()
    }
}

fn parse_number<N: core::str::FromStr>(key: &'static str, raw: &str) -> Result<N, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.port, 3000);
        assert!(config.database_url.is_none());
        assert_eq!(config.uploads_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.verbose_diagnostics());
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("APP_ENV", "production"),
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/entipedia"),
            ("API_BASE_URL", "https://api.example.do/"),
        ])
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/entipedia")
        );
        assert_eq!(config.api_base_url, "https://api.example.do");
        assert!(!config.verbose_diagnostics());
    }

    #[test]
    fn node_env_is_a_fallback() {
        let config = load(&[("NODE_ENV", "test")]).unwrap();
        assert_eq!(config.environment, Environment::Test);

        let config = load(&[("NODE_ENV", "test"), ("APP_ENV", "production")]).unwrap();
        assert_eq!(config.environment, Environment::Production);
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let config = load(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn invalid_values_are_reported() {
        assert_eq!(
            load(&[("PORT", "eighty")]).unwrap_err(),
            ConfigError::Invalid {
                key: "PORT",
                value: "eighty".to_string()
            }
        );
        assert!(load(&[("APP_ENV", "staging")]).is_err());
        assert!(load(&[("MAX_UPLOAD_BYTES", "-1")]).is_err());
    }
}

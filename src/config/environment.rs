// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment-based configuration management for production deployment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::warn;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Type-safe database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database with file path
    SQLite { path: PathBuf },
    /// In-memory SQLite (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s.strip_prefix("sqlite:").unwrap_or(s);
        if path_str == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path_str),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_string(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/courses.db"),
        }
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 token signing secret. Absence is a hard error at login time,
    /// not at boot; `from_env` only warns.
    pub jwt_secret: Option<String>,
    /// Session token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// Deployment-level shared secret gating password rotation.
    /// Rotation requires this key in addition to the current password.
    pub password_change_key: Option<String>,
}

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Allowed CORS origins, comma-separated, or "*"
    pub cors_allowed_origins: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable fails to parse
    pub fn from_env() -> Result<Self> {
        let http_port = env_or("HTTP_PORT", "8080")
            .parse::<u16>()
            .context("invalid HTTP_PORT")?;

        let jwt_expiry_hours = env_or(
            "JWT_EXPIRES_IN_HOURS",
            &crate::auth::DEFAULT_TOKEN_EXPIRY_HOURS.to_string(),
        )
        .parse::<i64>()
        .context("invalid JWT_EXPIRES_IN_HOURS")?;

        let jwt_secret = env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
        if jwt_secret.is_none() {
            // Deployment precondition for login; surfaced early so operators
            // see it before the first 500
            warn!("JWT_SECRET is not set; logins will fail until it is configured");
        }

        let password_change_key = env::var("PASSWORD_CHANGE_KEY")
            .ok()
            .filter(|s| !s.is_empty());
        if password_change_key.is_none() {
            warn!("PASSWORD_CHANGE_KEY is not set; password rotation is disabled");
        }

        Ok(Self {
            http_port,
            log_level: LogLevel::from_str_or_default(&env_or("RUST_LOG", "info")),
            database_url: DatabaseUrl::parse_url(&env_or("DATABASE_URL", "sqlite:./data/courses.db")),
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours,
                password_change_key,
            },
            cors_allowed_origins: env_or("CORS_ALLOWED_ORIGINS", "*"),
        })
    }

    /// One-line summary for startup logging. Secrets are reported only as
    /// present/absent.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "port={} db={} token_ttl_hours={} jwt_secret={} rotation_key={}",
            self.http_port,
            self.database_url,
            self.auth.jwt_expiry_hours,
            if self.auth.jwt_secret.is_some() {
                "set"
            } else {
                "MISSING"
            },
            if self.auth.password_change_key.is_some() {
                "set"
            } else {
                "MISSING"
            },
        )
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_parsing() {
        assert!(DatabaseUrl::parse_url("sqlite::memory:").is_memory());
        assert!(DatabaseUrl::parse_url(":memory:").is_memory());

        let file = DatabaseUrl::parse_url("sqlite:./data/courses.db");
        assert_eq!(file.to_connection_string(), "sqlite:./data/courses.db");

        // Bare paths are treated as SQLite files
        let bare = DatabaseUrl::parse_url("./archive.db");
        assert_eq!(bare.to_connection_string(), "sqlite:./archive.db");
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str_or_default("bogus"), LogLevel::Info);
    }

    #[test]
    fn test_summary_redacts_secrets() {
        let config = ServerConfig {
            http_port: 8080,
            log_level: LogLevel::Info,
            database_url: DatabaseUrl::Memory,
            auth: AuthConfig {
                jwt_secret: Some("super-secret-value".into()),
                jwt_expiry_hours: 24,
                password_change_key: Some("rotation-key-value".into()),
            },
            cors_allowed_origins: "*".into(),
        };

        let summary = config.summary();
        assert!(!summary.contains("super-secret-value"));
        assert!(!summary.contains("rotation-key-value"));
        assert!(summary.contains("jwt_secret=set"));
    }
}

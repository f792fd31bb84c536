//! Database configuration module.
//!
//! Provides configuration structures for database connection management.

use std::time::Duration;

use crate::config::{ConfigError, parse_or};

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    pub max_lifetime_secs: u64,

    /// Per-query timeout in milliseconds
    pub query_timeout_ms: u64,
}

impl DatabaseConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `DATABASE_URL`: PostgreSQL connection string (required)
    /// - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 20)
    /// - `DB_MIN_CONNECTIONS`: Minimum pool size (default: 5)
    /// - `DB_CONNECTION_TIMEOUT`: Connection timeout in seconds (default: 10)
    /// - `DB_IDLE_TIMEOUT`: Idle timeout in seconds (default: 600)
    /// - `DB_MAX_LIFETIME`: Max lifetime in seconds (default: 1800)
    /// - `DB_QUERY_TIMEOUT_MS`: Per-query timeout in milliseconds (default: 5000)
    ///
    /// # Errors
    ///
    /// Returns error if `DATABASE_URL` is not set or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| ConfigError::MissingRequired {
            var: "DATABASE_URL".to_string(),
            hint: "e.g. postgres://postgres@localhost/session_auth".to_string(),
        })?;

        let config = Self {
            database_url,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 20)?,
            min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", 5)?,
            connection_timeout_secs: parse_or(&lookup, "DB_CONNECTION_TIMEOUT", 10)?,
            idle_timeout_secs: parse_or(&lookup, "DB_IDLE_TIMEOUT", 600)?,
            max_lifetime_secs: parse_or(&lookup, "DB_MAX_LIFETIME", 1800)?,
            query_timeout_ms: parse_or(&lookup, "DB_QUERY_TIMEOUT_MS", 5000)?,
        };

        if config.min_connections > config.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!("Cannot exceed max connections ({})", config.max_connections),
            });
        }

        Ok(config)
    }

    /// Create a default configuration for development
    ///
    /// Uses `postgres://postgres@localhost/session_auth` as the database URL
    pub fn development() -> Self {
        Self {
            database_url: "postgres://postgres@localhost/session_auth".to_string(),
            max_connections: 20,
            min_connections: 5,
            connection_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            query_timeout_ms: 5000,
        }
    }

    /// Per-query timeout as a [`Duration`]
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::development()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_database_url() {
        let err = DatabaseConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "DATABASE_URL"));
    }

    #[test]
    fn test_defaults() {
        let config = DatabaseConfig::from_lookup(|key| {
            (key == "DATABASE_URL").then(|| "postgres://localhost/test".to_string())
        })
        .unwrap();
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);
        assert_eq!(config.query_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_min_above_max_rejected() {
        let err = DatabaseConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/test".to_string()),
            "DB_MAX_CONNECTIONS" => Some("2".to_string()),
            "DB_MIN_CONNECTIONS" => Some("3".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}

//! Authentication configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::str::FromStr;

/// Token signing configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC signing secret (required)
    pub secret: String,
    /// `iss` claim written into and required from access tokens
    pub issuer: String,
    /// `aud` claim written into and required from access tokens
    pub audience: String,
    /// Access token lifetime in minutes
    pub access_token_minutes: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_token_minutes", &self.access_token_minutes)
            .finish()
    }
}

/// Complete authentication configuration loaded from environment variables
#[derive(Clone)]
pub struct AuthConfig {
    /// Access token settings
    pub jwt: JwtConfig,
    /// Refresh token lifetime in days
    pub refresh_token_days: i64,
    /// Server-side pepper mixed into every password hash (required)
    pub password_pepper: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt", &self.jwt)
            .field("refresh_token_days", &self.refresh_token_days)
            .field("password_pepper", &"<redacted>")
            .finish()
    }
}

/// Default `iss` claim
pub const DEFAULT_ISSUER: &str = "session_auth";

/// Default `aud` claim
pub const DEFAULT_AUDIENCE: &str = "session_auth_users";

/// Default access token lifetime (minutes)
pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 15;

/// Default refresh token lifetime (days)
pub const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 7;

impl AuthConfig {
    /// Load configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `JWT_SECRET`: signing secret, at least 32 characters (required)
    /// - `JWT_ISSUER`: token issuer (default: `session_auth`)
    /// - `JWT_AUDIENCE`: token audience (default: `session_auth_users`)
    /// - `JWT_ACCESS_TOKEN_MINUTES`: access token lifetime (default: 15)
    /// - `REFRESH_TOKEN_DAYS`: refresh token lifetime (default: 7)
    /// - `PASSWORD_PEPPER`: hashing pepper, at least 16 characters (required)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// [`AuthConfig::from_env`] is this function over the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").ok_or_else(|| ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let password_pepper =
            lookup("PASSWORD_PEPPER").ok_or_else(|| ConfigError::MissingRequired {
                var: "PASSWORD_PEPPER".to_string(),
                hint: "Generate with: openssl rand -hex 16".to_string(),
            })?;

        let config = AuthConfig {
            jwt: JwtConfig {
                secret,
                issuer: lookup("JWT_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
                audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
                access_token_minutes: parse_or(
                    &lookup,
                    "JWT_ACCESS_TOKEN_MINUTES",
                    DEFAULT_ACCESS_TOKEN_MINUTES,
                )?,
            },
            refresh_token_days: parse_or(&lookup, "REFRESH_TOKEN_DAYS", DEFAULT_REFRESH_TOKEN_DAYS)?,
            password_pepper,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "Must be at least 32 characters (128-bit security)".to_string(),
            });
        }

        if self.password_pepper.len() < 16 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_PEPPER".to_string(),
                reason: "Must be at least 16 characters (64-bit security)".to_string(),
            });
        }

        if self.jwt.issuer.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "JWT_ISSUER".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.jwt.audience.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "JWT_AUDIENCE".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.jwt.access_token_minutes <= 0 {
            return Err(ConfigError::Invalid {
                var: "JWT_ACCESS_TOKEN_MINUTES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.refresh_token_days <= 0 {
            return Err(ConfigError::Invalid {
                var: "REFRESH_TOKEN_DAYS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse a looked-up value, falling back to `default` when the key is unset.
pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Cannot parse {raw:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
            ("PASSWORD_PEPPER", "pepper-pepper-16"),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let config = AuthConfig::from_lookup(lookup_from(&required())).unwrap();
        assert_eq!(config.jwt.issuer, DEFAULT_ISSUER);
        assert_eq!(config.jwt.audience, DEFAULT_AUDIENCE);
        assert_eq!(config.jwt.access_token_minutes, 15);
        assert_eq!(config.refresh_token_days, 7);
    }

    #[test]
    fn test_overrides_applied() {
        let mut pairs = required();
        pairs.push(("JWT_ISSUER", "acme"));
        pairs.push(("JWT_AUDIENCE", "acme-web"));
        pairs.push(("JWT_ACCESS_TOKEN_MINUTES", "5"));
        pairs.push(("REFRESH_TOKEN_DAYS", " 30 "));

        let config = AuthConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.jwt.issuer, "acme");
        assert_eq!(config.jwt.audience, "acme-web");
        assert_eq!(config.jwt.access_token_minutes, 5);
        assert_eq!(config.refresh_token_days, 30);
    }

    #[test]
    fn test_missing_secret() {
        let err = AuthConfig::from_lookup(lookup_from(&[("PASSWORD_PEPPER", "pepper-pepper-16")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = AuthConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "too-short"),
            ("PASSWORD_PEPPER", "pepper-pepper-16"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "JWT_SECRET"));
    }

    #[test]
    fn test_unparseable_number_rejected() {
        let mut pairs = required();
        pairs.push(("REFRESH_TOKEN_DAYS", "a week"));
        let err = AuthConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "REFRESH_TOKEN_DAYS"));
    }

    #[test]
    fn test_zero_lifetime_rejected() {
        let mut pairs = required();
        pairs.push(("JWT_ACCESS_TOKEN_MINUTES", "0"));
        let err = AuthConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { ref var, .. } if var == "JWT_ACCESS_TOKEN_MINUTES")
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AuthConfig::from_lookup(lookup_from(&required())).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("0123456789abcdef"));
        assert!(!rendered.contains("pepper-pepper-16"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "JWT_SECRET".to_string(),
            hint: "Use openssl".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("JWT_SECRET"));
        assert!(msg.contains("Use openssl"));
    }
}

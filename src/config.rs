// Process configuration loaded from the environment

use std::env;

use thiserror::Error;

const DEFAULT_ACCESS_TTL: &str = "1h";
const DEFAULT_REFRESH_TTL: &str = "24h";

/// Errors raised while loading configuration at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} has an invalid duration: '{value}'")]
    InvalidDuration { name: &'static str, value: String },

    #[error("{0} is not a valid port")]
    InvalidPort(String),

    #[error("access token lifetime ({access}s) must be shorter than refresh token lifetime ({refresh}s)")]
    LifetimeOrder { access: i64, refresh: i64 },
}

/// Signing secret and lifetimes used by the token service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds
    pub access_ttl: i64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl: i64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub api_key: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let database_url = required("DATABASE_URL")?;
        let secret = required("JWT_SECRET_KEY")?;
        let api_key = required("API_KEY")?;

        let access_raw =
            lookup("JWT_ACCESS_EXPIRED").unwrap_or_else(|| DEFAULT_ACCESS_TTL.to_string());
        let refresh_raw =
            lookup("JWT_REFRESH_EXPIRED").unwrap_or_else(|| DEFAULT_REFRESH_TTL.to_string());

        let access_ttl = parse_duration(&access_raw).ok_or(ConfigError::InvalidDuration {
            name: "JWT_ACCESS_EXPIRED",
            value: access_raw.clone(),
        })?;
        let refresh_ttl = parse_duration(&refresh_raw).ok_or(ConfigError::InvalidDuration {
            name: "JWT_REFRESH_EXPIRED",
            value: refresh_raw.clone(),
        })?;

        if access_ttl >= refresh_ttl {
            return Err(ConfigError::LifetimeOrder {
                access: access_ttl,
                refresh: refresh_ttl,
            });
        }

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port_raw = lookup("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port_raw
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port_raw))?;

        Ok(Self {
            database_url,
            jwt: JwtConfig {
                secret,
                access_ttl,
                refresh_ttl,
            },
            api_key,
            host,
            port,
        })
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a lifetime such as `3600`, `90s`, `15m`, `1h` or `7d` into seconds.
/// Zero and negative lifetimes are rejected.
pub fn parse_duration(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (digits, multiplier) = match raw.chars().last()? {
        's' => (&raw[..raw.len() - 1], 1),
        'm' => (&raw[..raw.len() - 1], 60),
        'h' => (&raw[..raw.len() - 1], 3_600),
        'd' => (&raw[..raw.len() - 1], 86_400),
        c if c.is_ascii_digit() => (raw, 1),
        _ => return None,
    };

    let value: i64 = digits.trim().parse().ok()?;
    if value <= 0 {
        return None;
    }
    value.checked_mul(multiplier)
}

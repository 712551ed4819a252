//! Application settings loaded from environment variables.

use std::env;

use crate::domain::BookingPolicy;

use super::constants::{
    DEFAULT_CORS_ORIGIN, DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS,
    DEFAULT_MAX_BOOKING_NIGHTS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SERVICE_FEE_PERCENT, MIN_JWT_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    /// Redis is optional; without it caching and rate limiting are off.
    pub redis_url: Option<String>,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origin: String,
    pub service_fee_percent: u32,
    pub max_booking_nights: i64,
    /// Only behind a reverse proxy that sets `X-Forwarded-For` may the rate
    /// limiter key on that header.
    pub trust_proxy: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &self.redis_url.as_ref().map(|_| "[REDACTED]"))
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("cors_origin", &self.cors_origin)
            .field("service_fee_percent", &self.service_fee_percent)
            .field("max_booking_nights", &self.max_booking_nights)
            .field("trust_proxy", &self.trust_proxy)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            jwt_secret,
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS")
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string()),
            service_fee_percent: parse_var("SERVICE_FEE_PERCENT")
                .unwrap_or(DEFAULT_SERVICE_FEE_PERCENT),
            max_booking_nights: parse_var("MAX_BOOKING_NIGHTS")
                .unwrap_or(DEFAULT_MAX_BOOKING_NIGHTS),
            trust_proxy: parse_var("TRUST_PROXY").unwrap_or(false),
        }
    }

    /// Build a configuration for tests with a fixed secret and no Redis.
    pub fn for_tests() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: None,
            jwt_secret: "test-secret-key-for-testing-only-32chars".to_string(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            service_fee_percent: DEFAULT_SERVICE_FEE_PERCENT,
            max_booking_nights: DEFAULT_MAX_BOOKING_NIGHTS,
            trust_proxy: false,
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    pub fn booking_policy(&self) -> BookingPolicy {
        BookingPolicy {
            service_fee_percent: self.service_fee_percent,
            max_nights: self.max_booking_nights,
        }
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let config = Config::for_tests();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("test-secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn server_addr_joins_host_and_port() {
        let mut config = Config::for_tests();
        config.server_host = "127.0.0.1".to_string();
        config.server_port = 8080;
        assert_eq!(config.server_addr(), "127.0.0.1:8080");
    }
}

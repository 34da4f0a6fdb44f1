use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Signing key for session tokens. Required; token issue/verify fail
    /// when empty.
    pub jwt_secret: String,
    /// Session lifetime in milliseconds. Also used as cookie Max-Age.
    pub expires_in_ms: u64,
    /// Mark the session cookie Secure (production preset).
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub window_ms: u64,
    pub max_attempts: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        // Environment preset first, then specific env var overrides
        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_MIN_CONNECTIONS") {
            self.database.min_connections = v.parse().unwrap_or(self.database.min_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs =
                v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_IDLE_TIMEOUT_SECS") {
            self.database.idle_timeout_secs = v.parse().unwrap_or(self.database.idle_timeout_secs);
        }

        if let Ok(v) = env::var("JWT_SECRET") {
            self.session.jwt_secret = v;
        }
        if let Ok(v) = env::var("SESSION_EXPIRES_IN") {
            self.session.expires_in_ms = v.parse().unwrap_or(self.session.expires_in_ms);
        }

        if let Ok(v) = env::var("AUTH_RATE_LIMIT_WINDOW_MS") {
            self.rate_limit.window_ms = v.parse().unwrap_or(self.rate_limit.window_ms);
        }
        if let Ok(v) = env::var("AUTH_RATE_LIMIT_MAX") {
            self.rate_limit.max_attempts = v.parse().unwrap_or(self.rate_limit.max_attempts);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/pawprint".to_string(),
                max_connections: 10,
                min_connections: 2,
                acquire_timeout_secs: 5,
                idle_timeout_secs: 30,
            },
            session: SessionConfig {
                jwt_secret: String::new(),
                expires_in_ms: 7 * 24 * 60 * 60 * 1000, // 7 days
                cookie_secure: false,
            },
            rate_limit: RateLimitConfig {
                window_ms: 15 * 60 * 1000,
                max_attempts: 5,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                min_connections: 2,
                acquire_timeout_secs: 5,
                idle_timeout_secs: 30,
            },
            session: SessionConfig {
                jwt_secret: String::new(),
                expires_in_ms: 7 * 24 * 60 * 60 * 1000,
                cookie_secure: true,
            },
            rate_limit: RateLimitConfig {
                window_ms: 15 * 60 * 1000,
                max_attempts: 5,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.session.expires_in_ms, 604_800_000);
        assert!(!config.session.cookie_secure);
        assert_eq!(config.rate_limit.max_attempts, 5);
        assert_eq!(config.rate_limit.window_ms, 900_000);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.session.cookie_secure);
        assert_eq!(config.database.max_connections, 20);
    }
}

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL used when materializing hypermedia hrefs
    pub public_base_url: String,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub default_page_size: usize,
    pub max_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Authenticated partition: token bucket
    pub token_limit: u32,
    pub tokens_per_period: u32,
    pub replenishment_secs: u64,
    pub queue_limit: usize,
    /// Anonymous partition: fixed window shared by all unauthenticated callers
    pub anonymous_permit_limit: u32,
    pub anonymous_window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    pub base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("API_PUBLIC_BASE_URL") {
            self.api.public_base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("API_ENABLE_CORS") {
            self.api.enable_cors = v.parse().unwrap_or(self.api.enable_cors);
        }
        if let Ok(v) = env::var("API_CORS_ORIGINS") {
            self.api.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("API_DEFAULT_PAGE_SIZE") {
            self.api.default_page_size = v.parse().unwrap_or(self.api.default_page_size);
        }
        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().unwrap_or(self.api.max_page_size);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        // Rate limit overrides
        if let Ok(v) = env::var("RATE_LIMIT_ENABLED") {
            self.rate_limit.enabled = v.parse().unwrap_or(self.rate_limit.enabled);
        }
        if let Ok(v) = env::var("RATE_LIMIT_TOKEN_LIMIT") {
            self.rate_limit.token_limit = v.parse().unwrap_or(self.rate_limit.token_limit);
        }
        if let Ok(v) = env::var("RATE_LIMIT_TOKENS_PER_PERIOD") {
            self.rate_limit.tokens_per_period =
                v.parse().unwrap_or(self.rate_limit.tokens_per_period);
        }
        if let Ok(v) = env::var("RATE_LIMIT_REPLENISHMENT_SECS") {
            self.rate_limit.replenishment_secs =
                v.parse().unwrap_or(self.rate_limit.replenishment_secs);
        }
        if let Ok(v) = env::var("RATE_LIMIT_QUEUE_LIMIT") {
            self.rate_limit.queue_limit = v.parse().unwrap_or(self.rate_limit.queue_limit);
        }
        if let Ok(v) = env::var("RATE_LIMIT_ANONYMOUS_PERMIT_LIMIT") {
            self.rate_limit.anonymous_permit_limit =
                v.parse().unwrap_or(self.rate_limit.anonymous_permit_limit);
        }
        if let Ok(v) = env::var("RATE_LIMIT_ANONYMOUS_WINDOW_SECS") {
            self.rate_limit.anonymous_window_secs =
                v.parse().unwrap_or(self.rate_limit.anonymous_window_secs);
        }

        // GitHub overrides
        if let Ok(v) = env::var("GITHUB_BASE_URL") {
            self.github.base_url = v.trim_end_matches('/').to_string();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                public_base_url: "http://localhost:3000".to_string(),
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
                default_page_size: 10,
                max_page_size: 100,
            },
            security: SecurityConfig {
                jwt_secret: "dev-only-secret-change-me".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
            rate_limit: RateLimitConfig {
                enabled: false,
                ..Self::default_rate_limit()
            },
            github: GitHubConfig { base_url: "https://api.github.com".to_string() },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                public_base_url: "https://staging.habit-api.example.com".to_string(),
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                default_page_size: 10,
                max_page_size: 50,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from env
                jwt_expiry_hours: 24,
            },
            rate_limit: Self::default_rate_limit(),
            github: GitHubConfig { base_url: "https://api.github.com".to_string() },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                public_base_url: "https://habit-api.example.com".to_string(),
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                default_page_size: 10,
                max_page_size: 50,
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from env
                jwt_expiry_hours: 4,
            },
            rate_limit: Self::default_rate_limit(),
            github: GitHubConfig { base_url: "https://api.github.com".to_string() },
        }
    }

    fn default_rate_limit() -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            token_limit: 100,
            tokens_per_period: 25,
            replenishment_secs: 60,
            queue_limit: 5,
            anonymous_permit_limit: 5,
            anonymous_window_secs: 60,
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
    fn development_config_disables_rate_limiting() {
        let config = AppConfig::development();
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.api.default_page_size, 10);
    }

    #[test]
    fn production_config_enables_rate_limiting() {
        let config = AppConfig::production();
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.token_limit, 100);
        assert_eq!(config.rate_limit.tokens_per_period, 25);
        assert_eq!(config.rate_limit.queue_limit, 5);
        assert_eq!(config.rate_limit.anonymous_permit_limit, 5);
    }
}

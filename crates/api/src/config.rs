use chrono::Duration;
use storefront_core::auth::{CredentialHasher, SessionConfig, TokenConfig};

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Access token signing secret and lifetime.
    pub jwt: TokenConfig,
    /// Session (refresh credential) lifetime.
    pub session: SessionConfig,
    /// Argon2 cost parameters for passwords and refresh secrets.
    pub argon2: argon2::Params,
    /// Webhook signing secret shared with the payment provider.
    pub webhook_secret: String,
    /// Maximum accepted age of a webhook signature in seconds (default: `300`).
    pub webhook_tolerance_secs: i64,
    /// Base URL of the product catalog.
    pub catalog_base_url: String,
    /// How long a fetched product is reused, in seconds (default: `300`).
    pub catalog_cache_ttl_secs: u64,
    /// Currency code stamped on new orders (default: `usd`).
    pub order_currency: String,
    /// Period of the expired-session sweep in seconds (default: `3600`).
    pub session_sweep_interval_secs: u64,
    /// Whether the refresh cookie carries the `Secure` attribute (default: `true`).
    pub cookie_secure: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `HOST`                        | `0.0.0.0`                  |
    /// | `PORT`                        | `8080`                     |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                       |
    /// | `JWT_SECRET`                  | required                   |
    /// | `JWT_ACCESS_TTL_MINS`         | `15`                       |
    /// | `JWT_REFRESH_TTL_DAYS`        | `7`                        |
    /// | `ARGON2_MEMORY_KIB`           | `19456`                    |
    /// | `ARGON2_ITERATIONS`           | `2`                        |
    /// | `ARGON2_PARALLELISM`          | `1`                        |
    /// | `STRIPE_WEBHOOK_SECRET`       | required                   |
    /// | `WEBHOOK_TOLERANCE_SECS`      | `300`                      |
    /// | `CATALOG_BASE_URL`            | `https://fakestoreapi.com` |
    /// | `CATALOG_CACHE_TTL_SECS`      | `300`                      |
    /// | `ORDER_CURRENCY`              | `usd`                      |
    /// | `SESSION_SWEEP_INTERVAL_SECS` | `3600`                     |
    /// | `COOKIE_SECURE`               | `true`                     |
    ///
    /// # Panics
    ///
    /// Panics if a required secret is missing or empty, or a value does not
    /// parse. Intended to run once at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = parse_env("PORT", "8080");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", "30");

        let jwt_secret = required_env("JWT_SECRET");
        let access_ttl_mins: i64 = parse_env("JWT_ACCESS_TTL_MINS", "15");
        let refresh_ttl_days: i64 = parse_env("JWT_REFRESH_TTL_DAYS", "7");

        let argon2 = argon2::Params::new(
            parse_env("ARGON2_MEMORY_KIB", &argon2::Params::DEFAULT_M_COST.to_string()),
            parse_env("ARGON2_ITERATIONS", &argon2::Params::DEFAULT_T_COST.to_string()),
            parse_env("ARGON2_PARALLELISM", &argon2::Params::DEFAULT_P_COST.to_string()),
            None,
        )
        .expect("ARGON2_* values must form valid argon2 parameters");

        let webhook_secret = required_env("STRIPE_WEBHOOK_SECRET");
        let webhook_tolerance_secs: i64 = parse_env("WEBHOOK_TOLERANCE_SECS", "300");

        let catalog_base_url = std::env::var("CATALOG_BASE_URL")
            .unwrap_or_else(|_| "https://fakestoreapi.com".into())
            .trim_end_matches('/')
            .to_string();
        let catalog_cache_ttl_secs: u64 = parse_env("CATALOG_CACHE_TTL_SECS", "300");

        let order_currency = std::env::var("ORDER_CURRENCY").unwrap_or_else(|_| "usd".into());
        let session_sweep_interval_secs: u64 = parse_env("SESSION_SWEEP_INTERVAL_SECS", "3600");
        assert!(
            session_sweep_interval_secs > 0,
            "SESSION_SWEEP_INTERVAL_SECS must be greater than zero"
        );
        let cookie_secure: bool = parse_env("COOKIE_SECURE", "true");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: TokenConfig {
                secret: jwt_secret,
                access_ttl: Duration::minutes(access_ttl_mins),
            },
            session: SessionConfig {
                refresh_ttl: Duration::days(refresh_ttl_days),
            },
            argon2,
            webhook_secret,
            webhook_tolerance_secs,
            catalog_base_url,
            catalog_cache_ttl_secs,
            order_currency,
            session_sweep_interval_secs,
            cookie_secure,
        }
    }

    pub fn hasher(&self) -> CredentialHasher {
        CredentialHasher::new(self.argon2.clone())
    }
}

fn required_env(name: &str) -> String {
    let value = std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set"));
    assert!(!value.trim().is_empty(), "{name} must not be empty");
    value
}

fn parse_env<T>(name: &str, default: &str) -> T
where
    T: std::str::FromStr,
{
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or_else(|_| panic!("{name} must be a valid {}", std::any::type_name::<T>()))
}

//! Server configuration
//!
//! Everything is environment-driven so the same binary works for local
//! development and hosted deployments. `ServerConfig::from_env` reads:
//!
//! - `MONGODB_URI`  - connection string (required before the first DB touch)
//! - `MONGODB_DB`   - database name override
//! - `HOST` / `PORT` - bind address (default 127.0.0.1:5000)
//! - `APP_ENV`      - "production" selects lazy per-request connection
//!   gating; anything else makes the standalone server connect eagerly at
//!   startup and fail fast
//! - `CORS_ALLOW_ORIGIN` - comma-separated origin allow-list

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default listen port
pub const DEFAULT_PORT: u16 = 5000;

/// Origins always allowed for the local frontend dev servers
const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];

/// Hostname suffix allowed for the hosted frontend previews
const DEFAULT_ALLOWED_SUFFIX: &str = ".vercel.app";

/// Deployment environment, from `APP_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    /// Whether the standalone entry connects at startup and treats a
    /// failure there as fatal. Production deployments keep the lazy
    /// per-request gate only, so cold starts never crash the process.
    pub fn connects_eagerly(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }
}

/// CORS allow-list: exact origins plus trusted hostname suffixes.
///
/// Credentialed requests are permitted, so the layer echoes the matched
/// origin back instead of `*`.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    pub allowed_origins: Vec<String>,
    pub allowed_suffixes: Vec<String>,
}

impl CorsPolicy {
    /// Build the policy from a raw `CORS_ALLOW_ORIGIN` value
    /// (comma-separated). Falls back to the local dev origins.
    pub fn from_allow_list(raw: Option<&str>) -> Self {
        let allowed_origins = match raw {
            Some(list) if !list.trim().is_empty() => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            _ => DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        Self {
            allowed_origins,
            allowed_suffixes: vec![DEFAULT_ALLOWED_SUFFIX.to_owned()],
        }
    }

    /// Check a request origin against the allow-list.
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
            || self.allowed_suffixes.iter().any(|s| origin.ends_with(s.as_str()))
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::from_allow_list(None)
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Database connection string. Required before the first connection
    /// attempt; kept optional here so the lazy variant can boot without it.
    pub mongodb_uri: Option<String>,
    /// Database name override (`MONGODB_DB`); otherwise derived from the URI.
    pub database: Option<String>,
    pub environment: Environment,
    pub cors: CorsPolicy,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST")
            .ok()
            .and_then(|h| h.parse().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let mongodb_uri = std::env::var("MONGODB_URI").ok().filter(|s| !s.is_empty());
        let database = std::env::var("MONGODB_DB").ok().filter(|s| !s.is_empty());
        let environment = Environment::parse(std::env::var("APP_ENV").ok().as_deref());
        let cors = CorsPolicy::from_allow_list(std::env::var("CORS_ALLOW_ORIGIN").ok().as_deref());

        Self {
            host,
            port,
            mongodb_uri,
            database,
            environment,
            cors,
        }
    }

    /// Socket address for the standalone listener.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            mongodb_uri: None,
            database: None,
            environment: Environment::Development,
            cors: CorsPolicy::default(),
        }
    }
}

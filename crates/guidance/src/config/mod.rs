use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Deployment stage the service believes it is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Top-level runtime configuration, assembled from `GUIDANCE_*` environment
/// variables (a `.env` file is honoured in development).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub stats: StatsConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::parse(&env_or("GUIDANCE_ENV", "development"));

        let server = ServerConfig {
            host: env_or("GUIDANCE_HOST", "127.0.0.1"),
            port: parse_env("GUIDANCE_PORT", 8080)?,
        };

        let telemetry = TelemetryConfig {
            log_filter: env_or("GUIDANCE_LOG", "info"),
        };

        let stats = StatsConfig {
            refresh_batch: parse_env("GUIDANCE_STATS_BATCH", 25)?,
            refresh_interval_secs: parse_env("GUIDANCE_STATS_INTERVAL", 60)?,
        };

        Ok(Self {
            environment,
            server,
            telemetry,
            stats,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            key,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Resolves the configured host to a socket address. `localhost` is
    /// accepted as a convenience alias for the loopback address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Logging controls consumed by [`crate::telemetry::init`].
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_filter: String,
}

/// Background refresh of cached candidate statistics.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    /// Maximum number of stale candidates recomputed per sweep.
    pub refresh_batch: usize,
    /// Seconds between sweeps.
    pub refresh_interval_secs: u64,
}

impl StatsConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} has unusable value '{value}'")
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "GUIDANCE_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

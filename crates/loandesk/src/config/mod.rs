use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use rust_decimal::Decimal;

use crate::lending::engine::EngineConfig;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub sweep: SweepConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let schedule =
            env::var("APP_SWEEP_SCHEDULE").unwrap_or_else(|_| "0 0 0 * * *".to_string());
        let midday_schedule = match env::var("APP_SWEEP_MIDDAY_SCHEDULE") {
            Ok(value) if matches!(value.trim(), "off" | "none" | "") => None,
            Ok(value) => Some(value),
            Err(_) => Some("0 0 12 * * *".to_string()),
        };

        let grace_period_days = env::var("APP_GRACE_PERIOD_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse::<i64>()
            .ok()
            .filter(|days| *days > 0)
            .ok_or(ConfigError::InvalidGracePeriod)?;

        let daily_penalty_rate = env::var("APP_DAILY_PENALTY_RATE")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<Decimal>()
            .ok()
            .filter(|rate| *rate > Decimal::ZERO)
            .ok_or(ConfigError::InvalidPenaltyRate)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            sweep: SweepConfig {
                schedule,
                midday_schedule,
            },
            engine: EngineConfig {
                grace_period_days,
                daily_penalty_rate,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Cron expressions for the scheduled sweeps (seconds-resolution cron).
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Daily sweep, midnight by default.
    pub schedule: String,
    /// Optional midday re-check; `APP_SWEEP_MIDDAY_SCHEDULE=off` disables it.
    pub midday_schedule: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidGracePeriod,
    InvalidPenaltyRate,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidGracePeriod => {
                write!(f, "APP_GRACE_PERIOD_DAYS must be a positive number of days")
            }
            ConfigError::InvalidPenaltyRate => {
                write!(f, "APP_DAILY_PENALTY_RATE must be a positive percentage")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

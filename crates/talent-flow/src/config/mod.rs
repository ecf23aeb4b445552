use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::NaiveTime;

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

        let engine = EngineConfig::load_from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            engine,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Tuning knobs shared by the scheduling, calling, and reminder workflows.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Earliest hour at which outbound calls may be placed.
    pub call_window_start: NaiveTime,
    /// Hour after which no new calls are placed.
    pub call_window_end: NaiveTime,
    /// Minimum ATS score required before a call is queued.
    pub min_call_score: f64,
    pub max_call_retries: u32,
    pub slot_duration_minutes: i64,
    pub slot_buffer_minutes: i64,
    pub max_reschedules: u32,
    pub reminder_max_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            call_window_start: NaiveTime::from_hms_opt(9, 0, 0).expect("valid window start"),
            call_window_end: NaiveTime::from_hms_opt(18, 0, 0).expect("valid window end"),
            min_call_score: 0.0,
            max_call_retries: 3,
            slot_duration_minutes: 30,
            slot_buffer_minutes: 15,
            max_reschedules: 2,
            reminder_max_retries: 3,
        }
    }
}

impl EngineConfig {
    fn load_from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let call_window_start =
            parse_time_var("ENGINE_CALL_WINDOW_START", defaults.call_window_start)?;
        let call_window_end = parse_time_var("ENGINE_CALL_WINDOW_END", defaults.call_window_end)?;
        let min_call_score = parse_number_var("ENGINE_MIN_CALL_SCORE", defaults.min_call_score)?;
        let max_call_retries =
            parse_number_var("ENGINE_MAX_CALL_RETRIES", defaults.max_call_retries)?;
        let slot_duration_minutes =
            parse_number_var("ENGINE_SLOT_DURATION_MINUTES", defaults.slot_duration_minutes)?;
        let slot_buffer_minutes =
            parse_number_var("ENGINE_SLOT_BUFFER_MINUTES", defaults.slot_buffer_minutes)?;
        let max_reschedules = parse_number_var("ENGINE_MAX_RESCHEDULES", defaults.max_reschedules)?;
        let reminder_max_retries =
            parse_number_var("ENGINE_REMINDER_MAX_RETRIES", defaults.reminder_max_retries)?;

        Ok(Self {
            call_window_start,
            call_window_end,
            min_call_score,
            max_call_retries,
            slot_duration_minutes,
            slot_buffer_minutes,
            max_reschedules,
            reminder_max_retries,
        })
    }
}

fn parse_time_var(name: &'static str, default: NaiveTime) -> Result<NaiveTime, ConfigError> {
    match env::var(name) {
        Ok(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
            .map_err(|_| ConfigError::InvalidTime { name }),
        Err(_) => Ok(default),
    }
}

fn parse_number_var<T: std::str::FromStr>(
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTime { name: &'static str },
    InvalidNumber { name: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTime { name } => {
                write!(f, "{} must be a time in HH:MM or HH:MM:SS form", name)
            }
            ConfigError::InvalidNumber { name } => {
                write!(f, "{} must be a valid number", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidTime { .. }
            | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

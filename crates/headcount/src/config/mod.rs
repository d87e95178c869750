use crate::workforce::aggregate::DEFAULT_PROBATION_MONTHS;
use crate::workforce::sources::{
    SourceLocation, SourceSpec, DEFAULT_DEPARTURES_SKIP_ROWS, DEFAULT_ROSTER_SKIP_ROWS,
};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

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
    pub sources: SourcesConfig,
    pub reporting: ReportingConfig,
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

        let sources = SourcesConfig {
            roster: optional_var("APP_ROSTER_SOURCE").map(|raw| SourceLocation::parse(&raw)),
            roster_skip_rows: numeric_var("APP_ROSTER_SKIP_ROWS", DEFAULT_ROSTER_SKIP_ROWS)?,
            departures: optional_var("APP_DEPARTURES_SOURCE")
                .map(|raw| SourceLocation::parse(&raw)),
            departures_skip_rows: numeric_var(
                "APP_DEPARTURES_SKIP_ROWS",
                DEFAULT_DEPARTURES_SKIP_ROWS,
            )?,
            fetch_timeout: Duration::from_secs(numeric_var("APP_FETCH_TIMEOUT_SECS", 30)?),
        };

        let reporting = ReportingConfig {
            probation_months: numeric_var("APP_PROBATION_MONTHS", DEFAULT_PROBATION_MONTHS)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            sources,
            reporting,
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn numeric_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { variable: name }),
        None => Ok(default),
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

/// Log filter and formatting.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Where the two spreadsheet exports are fetched from.
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    pub roster: Option<SourceLocation>,
    pub roster_skip_rows: usize,
    pub departures: Option<SourceLocation>,
    pub departures_skip_rows: usize,
    pub fetch_timeout: Duration,
}

impl SourcesConfig {
    pub fn roster_spec(&self) -> Result<SourceSpec, ConfigError> {
        self.roster
            .clone()
            .map(|location| SourceSpec::new(location, self.roster_skip_rows))
            .ok_or(ConfigError::MissingSource {
                variable: "APP_ROSTER_SOURCE",
            })
    }

    pub fn departures_spec(&self) -> Result<SourceSpec, ConfigError> {
        self.departures
            .clone()
            .map(|location| SourceSpec::new(location, self.departures_skip_rows))
            .ok_or(ConfigError::MissingSource {
                variable: "APP_DEPARTURES_SOURCE",
            })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportingConfig {
    pub probation_months: u32,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str },
    MissingSource { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable } => {
                write!(f, "{variable} must be a non-negative integer")
            }
            ConfigError::MissingSource { variable } => {
                write!(f, "no source configured: set {variable} or pass it on the command line")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::MissingSource { .. } => None,
        }
    }
}

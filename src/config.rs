//! Configuration module for the schoolboard application.
//!
//! Values are read from the environment (optionally seeded from `.env`).
//! Durations accept plain seconds (`15`) or unit suffixes (`1500ms`, `2m`).

use fundu::{DurationParser, TimeUnit};
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use url::Url;

use crate::monitor::MonitorOptions;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Log level for the application
    ///
    /// Only affects `schoolboard` module logs; dependencies stay at `warn`.
    /// Defaults to "info" if not specified
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Base URL of the school management REST backend
    pub api_base_url: Url,
    /// Bearer token sent with every backend request
    #[serde(default)]
    pub api_token: Option<String>,
    /// Port for the web server (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout for backend calls
    #[serde(
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub request_timeout: Duration,
    /// Graceful shutdown timeout duration
    ///
    /// Accepts both numeric values (seconds) and duration strings
    /// Defaults to 8 seconds if not specified
    #[serde(
        default = "default_shutdown_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub shutdown_timeout: Duration,
    /// Outgoing requests per second to the backend
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_second: u32,
    /// How many audit logs the monitoring view loads
    #[serde(default = "default_audit_log_limit")]
    pub audit_log_limit: u32,
    /// Serve demo monitoring data when the backend cannot be reached
    #[serde(default)]
    pub mock_fallback: bool,
}

impl Config {
    pub fn monitor_options(&self) -> MonitorOptions {
        MonitorOptions {
            audit_log_limit: self.audit_log_limit,
            mock_fallback: self.mock_fallback,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(8)
}

fn default_rate_limit() -> u32 {
    20
}

fn default_audit_log_limit() -> u32 {
    50
}

/// Parse a duration string, treating a bare number as seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let parser =
        DurationParser::with_time_units(&[TimeUnit::MilliSecond, TimeUnit::Second, TimeUnit::Minute]);
    let parsed = parser
        .parse(input.trim())
        .map_err(|e| format!("invalid duration '{input}': {e}"))?;
    Duration::try_from(parsed).map_err(|e| format!("duration out of range '{input}': {e}"))
}

/// Custom deserializer for duration fields that accepts both numeric and string values
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{Error, Visitor};

    struct DurationVisitor;

    impl Visitor<'_> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a duration string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            parse_duration(value).map_err(E::custom)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(Duration::from_secs(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            u64::try_from(value)
                .map(Duration::from_secs)
                .map_err(|_| E::custom("duration cannot be negative"))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Duration::try_from_secs_f64(value).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(DurationVisitor)
}

use std::time::Duration;

use calc_core::OperationTimes;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
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
    /// Simulated duration attached to each task, per operator.
    pub operation_times: OperationTimes,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            cors_origins: vec!["http://localhost:5173".into()],
            request_timeout_secs: 30,
            operation_times: OperationTimes::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `8080`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `TIME_ADDITION_MS`        | `2000`                     |
    /// | `TIME_SUBTRACTION_MS`     | `2000`                     |
    /// | `TIME_MULTIPLICATIONS_MS` | `3000`                     |
    /// | `TIME_DIVISIONS_MS`       | `4000`                     |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or(defaults.host);

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| defaults.port.to_string())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or(defaults.cors_origins);

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults.request_timeout_secs.to_string())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let base = defaults.operation_times;
        let operation_times = OperationTimes {
            addition: duration_ms("TIME_ADDITION_MS", base.addition),
            subtraction: duration_ms("TIME_SUBTRACTION_MS", base.subtraction),
            multiplication: duration_ms("TIME_MULTIPLICATIONS_MS", base.multiplication),
            division: duration_ms("TIME_DIVISIONS_MS", base.division),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            operation_times,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Read a millisecond duration, falling back to `default` when the variable
/// is unset or not a non-negative integer.
fn duration_ms(var: &str, default: Duration) -> Duration {
    let Ok(raw) = std::env::var(var) else {
        return default;
    };
    parse_duration_ms(&raw).unwrap_or_else(|| {
        tracing::warn!(
            var,
            value = %raw,
            default_ms = default.as_millis() as u64,
            "Invalid operation time, using default",
        );
        default
    })
}

fn parse_duration_ms(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().map(Duration::from_millis)
}

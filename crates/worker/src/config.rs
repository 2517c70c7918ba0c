use std::time::Duration;

/// Fallback agent count when `COMPUTING_POWER` is missing or unusable.
pub const DEFAULT_COMPUTING_POWER: usize = 2;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Base URL of the orchestrator, without a trailing slash.
    pub orchestrator_url: String,
    /// Number of concurrent polling agents.
    pub computing_power: usize,
    /// Pause between polls when the queue is empty or unreachable.
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            orchestrator_url: "http://localhost:8080".into(),
            computing_power: DEFAULT_COMPUTING_POWER,
            poll_interval: Duration::from_millis(2000),
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default                 |
    /// |--------------------|-------------------------|
    /// | `ORCHESTRATOR_URL` | `http://localhost:8080` |
    /// | `COMPUTING_POWER`  | `2`                     |
    /// | `POLL_INTERVAL_MS` | `2000`                  |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let orchestrator_url = std::env::var("ORCHESTRATOR_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.orchestrator_url);

        let computing_power = match std::env::var("COMPUTING_POWER") {
            Ok(raw) => parse_computing_power(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    value = %raw,
                    fallback = DEFAULT_COMPUTING_POWER,
                    "COMPUTING_POWER must be a positive integer, using fallback",
                );
                DEFAULT_COMPUTING_POWER
            }),
            Err(_) => defaults.computing_power,
        };

        let poll_interval = std::env::var("POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        Self {
            orchestrator_url,
            computing_power,
            poll_interval,
        }
    }
}

/// `None` for anything that is not a strictly positive integer.
fn parse_computing_power(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|n| *n > 0)
}

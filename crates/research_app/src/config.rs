use std::time::Duration;

/// Client settings, overridable from the environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// HTTP(S) origin of the orchestrator; the WebSocket endpoint is
    /// derived from it.
    pub origin: String,
    /// Whether a Turnstile token is attached to start commands.
    pub use_turnstile: bool,
    /// How long a parked start waits for the connection to open.
    pub connect_timeout: Duration,
    /// Pump cadence for the CLI embedder.
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8000".to_string(),
            use_turnstile: false,
            connect_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(75),
        }
    }
}

impl ClientConfig {
    /// Builds the default config with environment overrides applied:
    /// `RESEARCH_ORIGIN`, `RESEARCH_USE_TURNSTILE`,
    /// `RESEARCH_CONNECT_TIMEOUT_MS` and `RESEARCH_POLL_INTERVAL_MS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(origin) = std::env::var("RESEARCH_ORIGIN") {
            if !origin.is_empty() {
                config.origin = origin;
            }
        }
        if let Ok(flag) = std::env::var("RESEARCH_USE_TURNSTILE") {
            config.use_turnstile = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        if let Some(timeout) = duration_from_env("RESEARCH_CONNECT_TIMEOUT_MS") {
            config.connect_timeout = timeout;
        }
        if let Some(interval) = duration_from_env("RESEARCH_POLL_INTERVAL_MS") {
            config.poll_interval = interval;
        }
        config
    }
}

fn duration_from_env(name: &str) -> Option<Duration> {
    let raw = std::env::var(name).ok()?;
    let millis: u64 = raw.parse().ok()?;
    Some(Duration::from_millis(millis))
}

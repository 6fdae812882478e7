use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

#[derive(Clone, Debug, PartialEq)]
pub struct PollPolicy {
    interval: Duration,
    backoff: f64,
    max_interval: Duration,
    max_duration: Option<Duration>,
}

impl PollPolicy {
    pub fn from_millis(interval_ms: u64) -> Result<Self, ConfigError> {
        if interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        let interval = Duration::from_millis(interval_ms);
        Ok(Self {
            interval,
            max_interval: interval,
            ..Self::default()
        })
    }

    pub fn with_backoff(mut self, factor: f64, max_interval: Duration) -> Result<Self, ConfigError> {
        if !factor.is_finite() || factor < 1.0 {
            return Err(ConfigError::InvalidBackoff(factor));
        }
        self.backoff = factor;
        self.max_interval = max_interval.max(self.interval);
        Ok(self)
    }

    pub fn with_max_duration(mut self, limit: Duration) -> Self {
        self.max_duration = Some(limit);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn backoff(&self) -> f64 {
        self.backoff
    }

    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    /// Unbounded when `None`.
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration
    }

    /// Delay to wait after a fetch that used `current`. Never exceeds
    /// `max_interval`, even when the product overflows a `Duration`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        if self.backoff <= 1.0 {
            return current;
        }
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff)
            .map_or(self.max_interval, |grown| grown.min(self.max_interval))
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        let interval = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);
        Self {
            interval,
            backoff: 1.0,
            max_interval: interval,
            max_duration: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub poll: PollPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            poll: PollPolicy::default(),
        }
    }
}

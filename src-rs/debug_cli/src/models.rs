use std::time::Duration;

use contentweaver_rs::{ClientConfig, ConfigError, PollPolicy};

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub client: ClientConfig,
    pub token: Option<String>,
    pub debug: bool,
}

impl CLIConfig {
    /// Replace the poll interval, keeping any configured backoff and limit.
    pub fn set_interval(&mut self, interval_ms: u64) -> Result<(), ConfigError> {
        let base = PollPolicy::from_millis(interval_ms)?;
        let current = &self.client.poll;
        let mut poll = base.clone();
        if current.backoff() > 1.0 {
            poll = poll.with_backoff(current.backoff(), current.max_interval().max(base.interval()))?;
        }
        if let Some(limit) = current.max_duration() {
            poll = poll.with_max_duration(limit);
        }
        self.client.poll = poll;
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        self.client.poll.interval()
    }
}

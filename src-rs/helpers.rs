use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::api::ContentWeaverClient;
use crate::config::{ClientConfig, PollPolicy};
use crate::error::{ClientError, ConfigError};
use crate::session::{NoSession, SessionProvider, StaticToken};

pub const ENV_URL: &str = "CONTENTWEAVER_URL";
pub const ENV_TOKEN: &str = "CONTENTWEAVER_TOKEN";
pub const ENV_POLL_INTERVAL_MS: &str = "CONTENTWEAVER_POLL_INTERVAL_MS";
pub const ENV_POLL_BACKOFF: &str = "CONTENTWEAVER_POLL_BACKOFF";
pub const ENV_POLL_MAX_SECS: &str = "CONTENTWEAVER_POLL_MAX_SECS";
pub const ENV_TIMEOUT_SECS: &str = "CONTENTWEAVER_TIMEOUT_SECS";

fn env_lookup(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// Build a client config from `lookup`, falling back to defaults for unset keys.
pub fn config_from_lookup<F>(lookup: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = ClientConfig::default();
    if let Some(url) = lookup(ENV_URL) {
        cfg.base_url = url;
    }
    if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
        cfg.request_timeout = Duration::from_secs(parse_value(ENV_TIMEOUT_SECS, &raw)?);
    }

    let mut poll = match lookup(ENV_POLL_INTERVAL_MS) {
        Some(raw) => PollPolicy::from_millis(parse_value(ENV_POLL_INTERVAL_MS, &raw)?)?,
        None => PollPolicy::default(),
    };
    if let Some(raw) = lookup(ENV_POLL_BACKOFF) {
        let factor: f64 = parse_value(ENV_POLL_BACKOFF, &raw)?;
        // cap the grown delay at 30s or the base interval, whichever is larger
        let cap = Duration::from_secs(30).max(poll.interval());
        poll = poll.with_backoff(factor, cap)?;
    }
    if let Some(raw) = lookup(ENV_POLL_MAX_SECS) {
        let secs: u64 = parse_value(ENV_POLL_MAX_SECS, &raw)?;
        if secs > 0 {
            poll = poll.with_max_duration(Duration::from_secs(secs));
        }
    }
    cfg.poll = poll;
    Ok(cfg)
}

pub fn load_client_config() -> Result<ClientConfig, ConfigError> {
    config_from_lookup(env_lookup)
}

pub fn session_from_token(token: Option<String>) -> Arc<dyn SessionProvider> {
    match token {
        Some(token) if !token.trim().is_empty() => Arc::new(StaticToken::new(&token)),
        _ => Arc::new(NoSession),
    }
}

pub fn build_client(
    cfg: &ClientConfig,
    session: Arc<dyn SessionProvider>,
) -> Result<Arc<ContentWeaverClient>, ClientError> {
    ContentWeaverClient::new(cfg, session).map(Arc::new)
}

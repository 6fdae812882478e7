use clap::Parser;
use contentweaver_rs::helpers::{load_client_config, ENV_TOKEN};
use contentweaver_rs::ConfigError;

use crate::models::CLIConfig;

#[derive(Debug, Parser)]
#[command(name = "contentweaver-debug", about = "Interactive client for the ContentWeaver backend")]
pub struct Args {
    /// Backend base URL, including any path prefix
    #[arg(long = "base")]
    pub base_url: Option<String>,
    /// Bearer token sent with every request
    #[arg(long, env = ENV_TOKEN, hide_env_values = true)]
    pub token: Option<String>,
    /// Poll interval in milliseconds
    #[arg(long = "interval")]
    pub interval_ms: Option<u64>,
    /// Print raw task results and verbose logs
    #[arg(long)]
    pub debug: bool,
}

pub fn parse_config() -> Result<CLIConfig, ConfigError> {
    let args = Args::parse();
    let mut cfg = CLIConfig {
        client: load_client_config()?,
        token: args.token,
        debug: args.debug,
    };
    if let Some(url) = args.base_url {
        cfg.client.base_url = url;
    }
    if let Some(ms) = args.interval_ms {
        cfg.set_interval(ms)?;
    }
    Ok(cfg)
}

mod cli;
mod models;
mod repl;
mod render;

use std::process::ExitCode;

use contentweaver_rs::helpers::{build_client, session_from_token};
use tracing_subscriber::EnvFilter;

use repl::REPL;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match cli::parse_config() {
        Ok(config) => config,
        Err(err) => {
            render::error(&err.to_string());
            return ExitCode::FAILURE;
        }
    };

    let default_level = if config.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = match build_client(&config.client, session_from_token(config.token.clone())) {
        Ok(client) => client,
        Err(err) => {
            render::error(&err.to_string());
            return ExitCode::FAILURE;
        }
    };
    let mut repl = REPL::new(config, client);
    repl.run().await;
    ExitCode::SUCCESS
}

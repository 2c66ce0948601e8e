//! devcamper server binary.
//!
//! Reads configuration (see [`devcamper::config`]), installs logging, and
//! serves the API until SIGTERM or Ctrl-C.

use std::process::ExitCode;
use std::sync::Arc;

use devcamper::{app, config, Config, MemoryStore, Server, ServerError};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let loaded = config::load_env_file(config::ENV_FILE)
        .and_then(|from_file| Ok((Config::from_env()?, from_file)));

    let default_level = match &loaded {
        Ok((config, _)) if config.mode.is_development() => "debug",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let result = match loaded {
        Ok((config, from_file)) => run(config, from_file).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "devcamper failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config, from_file: bool) -> Result<(), ServerError> {
    if from_file {
        info!(path = config::ENV_FILE, "loaded environment file");
    }
    info!(mode = %config.mode, addr = %config.addr(), "starting devcamper");

    let router = app(Arc::new(MemoryStore::new()));

    Server::from_addr(config.addr())
        .request_logging(config.mode.is_development())
        .serve(router)
        .await
}

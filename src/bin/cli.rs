//! toolchat - chat with a tool-calling assistant from the terminal or a browser

use std::sync::Arc;

use clap::Parser;
use toolchat::agent::ChatAgent;
use toolchat::cli::{Cli, Mode};
use toolchat::config::{load_environment, Config, LogConfig};
use toolchat::web;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_new(&log.level).unwrap_or_else(|_| "info,toolchat=debug".into());

    // stdout carries the CLI answer, logs go to stderr
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if log.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

// The environment is rewritten before the runtime spawns its workers.
fn main() -> anyhow::Result<()> {
    let env_file = load_environment();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    cli.apply_to(&mut config);

    init_logging(&config.log);
    match env_file {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }
    config.validate()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.mode(), config))
}

async fn run(mode: Mode, config: Config) -> anyhow::Result<()> {
    info!(
        "Starting {} v{} with model {}",
        toolchat::NAME,
        toolchat::VERSION,
        config.openai.model
    );

    let agent = Arc::new(ChatAgent::from_config(&config)?);

    match mode {
        Mode::Cli { prompt } => {
            let reply = agent.respond(&prompt).await.map_err(|e| {
                error!("Agent turn failed: {}", e);
                e
            })?;
            println!("{}", reply);
        }
        Mode::Web => {
            let addr = config.web.socket_addr()?;
            web::serve(agent, addr).await?;
        }
    }

    Ok(())
}

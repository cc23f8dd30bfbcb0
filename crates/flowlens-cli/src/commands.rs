use anyhow::{Context, Result};
use flowlens_normalizer::Normalizer;
use flowlens_store::{Config, FlowStore, SessionCredential};
use tracing::info;

use crate::args::{Cli, Commands};
use crate::logging;
use crate::mcp::{self, FlowLensServer, FlowTools, ToolRegistry};

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.log_level);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Tools => print_tools(),
        Commands::Serve => serve(&cli),
    }
}

fn print_tools() -> Result<()> {
    let registry = ToolRegistry::new();
    println!("{}", serde_json::to_string_pretty(&registry.to_json())?);
    Ok(())
}

fn serve(cli: &Cli) -> Result<()> {
    // Everything that can fail at startup is checked before stdin is touched
    let credential = SessionCredential::from_sources(cli.token.as_deref())?;
    let config = Config::resolve(cli.config.as_deref()).context("failed to load configuration")?;
    let store = FlowStore::from_config(&config, credential)?;
    let normalizer = Normalizer::new(config.normalizer_config());
    info!(
        cache_ttl_secs = config.cache.ttl_secs,
        max_attempts = config.retry.max_attempts,
        "configuration loaded"
    );

    let server = FlowLensServer::new(FlowTools::new(store, normalizer));
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(mcp::run_server(server))
}

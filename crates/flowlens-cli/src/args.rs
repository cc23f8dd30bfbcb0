use crate::types::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flowlens-mcp")]
#[command(about = "Serve FlowLens browser flow recordings to AI agents over MCP (stdio)", long_about = None)]
#[command(version)]
pub struct Cli {
    /// FlowLens platform access token
    #[arg(long, env = "FLOWLENS_MCP_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Configuration file (TOML)
    #[arg(long, env = "FLOWLENS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log verbosity on stderr; RUST_LOG takes precedence when set
    #[arg(long, default_value = "info", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the MCP server on stdin/stdout (default)
    Serve,

    /// Print the tool registry as JSON
    Tools,
}

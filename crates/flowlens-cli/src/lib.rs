// NOTE: flowlens-mcp layout
//
// flowlens-types       canonical Flow / Event model shared by every crate
// flowlens-normalizer  the only code that knows the platform's raw flow shape
// flowlens-store       credential, config, TTL cache, retrying HTTP client
// flowlens-mcp (here)  JSON-RPC stdio server, tool registry, CLI entry point
//
// Only raw flows are cached; normalization runs on every tool call.

mod args;
mod commands;
mod logging;
pub mod mcp;
pub mod types;

pub use args::{Cli, Commands};
pub use commands::run;

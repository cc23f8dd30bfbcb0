//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes FlowLens flows to AI agents via JSON-RPC over stdio.

pub mod dto;
pub mod error;
pub mod registry;
mod server;
mod tools;

pub use error::{ToolError, ToolErrorKind};
pub use registry::{ArgSpec, ArgType, ToolRegistry, ToolSpec};
pub use server::{FlowLensServer, SUPPORTED_PROTOCOL_VERSIONS, run_server, serve};
pub use tools::FlowTools;

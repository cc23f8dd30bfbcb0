//! Testing infrastructure for flowlens integration tests.
//!
//! - `fake`: scriptable in-memory [`FlowSource`](flowlens_store::FlowSource)
//! - `fixtures`: raw flow and timeline record builders
//! - `assertions`: checks over MCP tool responses

pub mod assertions;
pub mod fake;
pub mod fixtures;

pub use fake::{FakeFlowSource, Scripted};
pub use fixtures::FlowBuilder;

//! Flow resolution for the flowlens MCP server.
//!
//! [`FlowStore`] turns a flow id into a [`RawFlow`](flowlens_normalizer::RawFlow):
//! it consults a TTL cache, single-flights concurrent misses per id, and
//! fetches through a [`FlowSource`] under a bounded [`RetryPolicy`].
//! [`HttpFlowSource`] is the production source; tests plug in fakes.

pub mod cache;
pub mod config;
pub mod credential;
pub mod error;
pub mod http;
pub mod retry;
pub mod source;
pub mod store;

pub use cache::FlowCache;
pub use config::{
    CacheConfig, Config, DEFAULT_BASE_URL, NormalizerSection, RemoteConfig, RetryConfig,
    URL_ENV_VAR,
};
pub use credential::{SessionCredential, TOKEN_ENV_VAR};
pub use error::{Error, Result};
pub use http::HttpFlowSource;
pub use retry::RetryPolicy;
pub use source::FlowSource;
pub use store::{FlowStore, StoreOptions};

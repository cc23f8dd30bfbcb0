//! Normalization of FlowLens platform flows.
//!
//! The platform serves flows in its own, versioned shape ([`RawFlow`]). This
//! crate is the only place that knows that shape: it decodes each timeline
//! record by its explicit `kind` discriminator, pairs network requests with
//! their responses, bounds payload sizes and produces the canonical
//! [`flowlens_types::Flow`] the rest of the system works with.

// Error types
pub mod error;

// Platform wire schema
pub mod schema;

// Raw → canonical conversion
pub mod normalize;

// Timeline aggregation
pub mod summary;

// Event selection
pub mod filter;

pub mod truncate;

pub use error::{Error, Result};
pub use filter::EventFilter;
pub use normalize::{DEFAULT_MAX_DROP_RATIO, Normalizer, NormalizerConfig, relative_time};
pub use schema::{RawFlow, RawFlowPage, RawFlowSummary, RawVideo};
pub use summary::summarize;
pub use truncate::{
    DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_DETAIL_BODY_BYTES, TRUNCATION_MARKER, truncate_text,
};

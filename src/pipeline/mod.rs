//! Error page resolution.
//!
//! # Data Flow
//! ```text
//! path + headers
//!     → code (path > X-Code > default)
//!     → CodeTable lookup (fallback: standard reason phrase)
//!     → format negotiation
//!     → template source (format template or picked HTML template)
//!     → RenderProperties
//!     → cache lookup / render
//!     → ErrorPage
//! ```
//!
//! # Design Decisions
//! - Built once from config and shared via `Arc`; `resolve` never blocks on I/O
//! - Request-time misconfiguration becomes a 500 page, never a panic

mod resolver;

pub use resolver::{Formats, Pipeline, PipelineOptions};

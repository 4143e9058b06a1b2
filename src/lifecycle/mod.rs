//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → listener stops accepting and drains
//!               → cache sweeper exits
//! ```
//!
//! # Design Decisions
//! - Ordered startup lives in main: config, logging, pipeline, then listener
//! - One broadcast reaches every background task

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

//! Status code descriptions.
//!
//! # Data Flow
//! ```text
//! built-in table (defaults.rs)
//!     + [codes] section of the config file
//!     → CodeTable (immutable after load)
//!     → CodeTable::find(code) on every request
//! ```
//!
//! # Design Decisions
//! - Patterns may use `*`, `x` or `X` as a per-digit wildcard ("4xx", "5**")
//! - Pattern length is significant: "4xx" never matches 4041
//! - Ties are broken by ascending pattern order, never by hash order

pub mod defaults;
pub mod table;

pub use table::{CodeDescription, CodeTable};

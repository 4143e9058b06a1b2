//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, resolve template paths)
//!     → CLI overrides applied in main
//!     → validation.rs (semantic checks, run once)
//!     → AppConfig (validated, immutable)
//!     → Pipeline::from_config (templates read, tables built)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults so an empty file (or none) is a valid config
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_templates, ConfigError};
pub use schema::{
    AppConfig, FormatsConfig, ListenerConfig, ObservabilityConfig, RenderingConfig, TemplateConfig,
    TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};

//! Template subsystem.
//!
//! # Data Flow
//! ```text
//! TemplateSet (name → source, built at startup)
//!     → picker.rs (choose a name per rotation mode)
//!     → properties.rs (per-request values)
//!     → cache.rs (lookup by template + properties)
//!     → render.rs on miss (Tera + functions.rs helpers)
//!     → minify.rs (HTML only, before caching)
//! ```
//!
//! # Design Decisions
//! - Everything here is synchronous; no I/O happens after startup
//! - Shared pieces (picker, cache, renderer) are owned by the pipeline and
//!   handed out through `Arc`, nothing is global

pub mod builtin;
pub mod cache;
pub mod functions;
pub mod l10n;
pub mod minify;
pub mod picker;
pub mod properties;
pub mod render;
pub mod sweeper;

use std::collections::BTreeMap;

pub use cache::RenderedPageCache;
pub use minify::Minifier;
pub use picker::{RotationMode, TemplatePicker};
pub use properties::RenderProperties;
pub use render::{RenderError, Renderer};
pub use sweeper::CacheSweeper;

/// Named template sources. Names are unique and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    templates: BTreeMap<String, String>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The templates compiled into the binary.
    pub fn builtin() -> Self {
        builtin::TEMPLATES.into_iter().collect()
    }

    /// Add or replace a template.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.templates.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl<N: Into<String>, S: Into<String>> FromIterator<(N, S)> for TemplateSet {
    fn from_iter<I: IntoIterator<Item = (N, S)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, source) in iter {
            set.insert(name, source);
        }
        set
    }
}

//! Tera-based template rendering.
//!
//! # Responsibilities
//! - Expand a template source against [`RenderProperties`]
//! - Provide the helper function table to every template
//!
//! # Design Decisions
//! - The base engine (helpers only, no templates) is built once
//! - Each render works on a clone with request-scoped helpers added, so no
//!   state leaks between requests
//! - Errors carry the whole Tera error chain, the top-level message alone
//!   rarely says what went wrong

use std::collections::HashMap;
use std::error::Error as _;

use tera::{Tera, Value};

use super::functions::register_builtins;
use super::properties::RenderProperties;

const TEMPLATE_NAME: &str = "error-page";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("failed to parse template: {0}")]
    Parse(String),
    #[error("failed to render template: {0}")]
    Execute(String),
}

/// Renders template sources with the built-in helpers.
#[derive(Debug, Clone)]
pub struct Renderer {
    base: Tera,
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_hostname(system_hostname())
    }

    /// Renderer whose `hostname()` helper returns `hostname`.
    pub fn with_hostname(hostname: impl Into<String>) -> Self {
        let mut base = Tera::default();
        register_builtins(&mut base, hostname.into());
        Self { base }
    }

    pub fn render(&self, source: &str, props: &RenderProperties) -> Result<String, RenderError> {
        let mut tera = self.base.clone();

        let show_details = props.show_details;
        let l10n_disabled = props.l10n_disabled;
        tera.register_function("hide_details", move |_: &HashMap<String, Value>| -> tera::Result<Value> {
            Ok(Value::Bool(!show_details))
        });
        tera.register_function("l10n_enabled", move |_: &HashMap<String, Value>| -> tera::Result<Value> {
            Ok(Value::Bool(!l10n_disabled))
        });

        tera.add_raw_template(TEMPLATE_NAME, source)
            .map_err(|e| RenderError::Parse(describe(&e)))?;

        tera.render(TEMPLATE_NAME, &props.to_context())
            .map_err(|e| RenderError::Execute(describe(&e)))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

/// Best-effort host name, empty when it cannot be determined.
fn system_hostname() -> String {
    if let Ok(name) = std::env::var("HOSTNAME") {
        if !name.trim().is_empty() {
            return name.trim().to_string();
        }
    }

    ["/proc/sys/kernel/hostname", "/etc/hostname"]
        .iter()
        .find_map(|path| std::fs::read_to_string(path).ok())
        .map(|name| name.trim().to_string())
        .unwrap_or_default()
}

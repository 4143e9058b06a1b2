//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! error page server. All types derive Serde traits for deserialization
//! from TOML files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::codes::CodeDescription;
use crate::template::builtin;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// How error pages are picked and rendered.
    pub rendering: RenderingConfig,

    /// Additional page templates; a name clash replaces the built-in one.
    pub templates: Vec<TemplateConfig>,

    /// Templates for non-HTML representations.
    pub formats: FormatsConfig,

    /// Code descriptions keyed by pattern ("404", "4xx", "5**").
    /// Overlaid on top of the built-in table.
    pub codes: BTreeMap<String, CodeDescription>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 10 }
    }
}

/// Two minutes, long enough for a typical restart or deploy.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 120;

/// Error page rendering options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Template used when rotation is disabled.
    pub template_name: String,

    /// `disabled`, `random-on-startup`, `random-on-each-request`,
    /// `random-daily` or `random-hourly`.
    pub rotation_mode: String,

    /// Code rendered when neither the path nor `X-Code` carry one.
    pub default_code: u16,

    /// Respond with the error code as HTTP status instead of 200.
    pub respond_with_same_code: bool,

    /// Expose request details (host, request id, ...) to templates.
    pub show_details: bool,

    /// Turn off client-side localization.
    pub disable_l10n: bool,

    /// Rendered page lifetime in seconds; 0 disables the cache.
    pub cache_ttl_secs: u64,

    /// `Retry-After` value for 5xx pages; 0 omits the header.
    pub retry_after_secs: u64,

    /// Minify rendered HTML pages. Other formats are never minified.
    pub minify: bool,

    /// Request headers copied onto the response when present.
    pub proxy_headers: Vec<String>,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            template_name: builtin::DEFAULT_TEMPLATE.to_string(),
            rotation_mode: "disabled".to_string(),
            default_code: 404,
            respond_with_same_code: false,
            show_details: false,
            disable_l10n: false,
            cache_ttl_secs: 2,
            retry_after_secs: DEFAULT_RETRY_AFTER_SECS,
            minify: true,
            proxy_headers: vec!["x-request-id".to_string()],
        }
    }
}

/// A page template, given inline or as a file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Template name; derived from the file stem when empty.
    pub name: String,

    /// Template file. Relative paths resolve against the config file.
    pub path: Option<PathBuf>,

    /// Inline template source; takes precedence over `path`.
    pub content: Option<String>,
}

impl TemplateConfig {
    pub fn inline(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            content: Some(content.into()),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }
}

/// Templates for the JSON, XML and plain-text representations.
///
/// `None` or an empty string turns the representation off, such requests
/// get the HTML page instead.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FormatsConfig {
    pub json: Option<String>,
    pub xml: Option<String>,
    pub plain: Option<String>,
}

impl Default for FormatsConfig {
    fn default() -> Self {
        Self {
            json: Some(builtin::JSON_FORMAT.to_string()),
            xml: Some(builtin::XML_FORMAT.to_string()),
            plain: Some(builtin::PLAIN_FORMAT.to_string()),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: `text` or `json`.
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

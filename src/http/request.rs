//! Error signal extraction.
//!
//! # Responsibilities
//! - Read the requested code from the URL path (`/404`, `/503.html`)
//! - Read the requested code from the `X-Code` header
//! - Copy request details when they are allowed to be shown
//!
//! # Design Decisions
//! - Codes must be 1-3 digits and positive, anything else is ignored
//! - No regex: the path check is a handful of byte comparisons

use axum::http::HeaderMap;

use super::headers::{
    HOST, X_CODE, X_FORWARDED_FOR, X_INGRESS_NAME, X_NAMESPACE, X_ORIGINAL_URI, X_REQUEST_ID,
    X_SERVICE_NAME, X_SERVICE_PORT,
};

/// Extract the code from a path like `/404`, `/404.html` or `/404.HTM`.
pub fn code_from_path(path: &str) -> Option<u16> {
    let name = path.strip_prefix('/').unwrap_or(path);
    let lower = name.to_ascii_lowercase();

    let digits = lower
        .strip_suffix(".html")
        .or_else(|| lower.strip_suffix(".htm"))
        .unwrap_or(&lower);

    parse_code(digits)
}

/// Extract the code from the `X-Code` header.
pub fn code_from_headers(headers: &HeaderMap) -> Option<u16> {
    headers
        .get(X_CODE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| parse_code(v.trim()))
}

/// Parse 1-3 ASCII digits into a positive code.
pub fn parse_code(value: &str) -> Option<u16> {
    if value.is_empty() || value.len() > 3 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    value.parse::<u16>().ok().filter(|code| *code > 0)
}

/// Request-context values passed through to the templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDetails {
    pub original_uri: String,
    pub namespace: String,
    pub ingress_name: String,
    pub service_name: String,
    pub service_port: String,
    pub request_id: String,
    pub forwarded_for: String,
    pub host: String,
}

impl RequestDetails {
    /// Copy the detail headers verbatim, missing ones become empty strings.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };

        Self {
            original_uri: get(X_ORIGINAL_URI),
            namespace: get(X_NAMESPACE),
            ingress_name: get(X_INGRESS_NAME),
            service_name: get(X_SERVICE_NAME),
            service_port: get(X_SERVICE_PORT),
            request_id: get(X_REQUEST_ID),
            forwarded_for: get(X_FORWARDED_FOR),
            host: get(HOST),
        }
    }
}

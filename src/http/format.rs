//! Client format negotiation.
//!
//! # Responsibilities
//! - Pick the representation the client prefers (JSON, XML, HTML, text)
//! - Honor `Content-Type`, then `X-Format`, then `Accept`
//!
//! # Design Decisions
//! - The first non-empty header decides, even if it cannot be parsed
//! - Broken `q` weights degrade to 0 instead of dropping the entry
//! - Weights are compared as integers (thousandths) to avoid float ordering

use std::fmt;

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::HeaderMap;

use super::headers::X_FORMAT;

/// Representation requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Unknown,
    Json,
    Xml,
    Html,
    PlainText,
}

impl Format {
    /// Value for the `Content-Type` response header.
    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json; charset=utf-8",
            Format::Xml => "application/xml; charset=utf-8",
            Format::Html => "text/html; charset=utf-8",
            Format::PlainText | Format::Unknown => "text/plain; charset=utf-8",
        }
    }

    /// Map a MIME type onto a format by substring.
    pub fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();

        if mime.contains("json") {
            Format::Json
        } else if mime.contains("xml") {
            Format::Xml
        } else if mime.contains("html") {
            Format::Html
        } else if mime.contains("plain") {
            Format::PlainText
        } else {
            Format::Unknown
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Unknown => "unknown",
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Html => "html",
            Format::PlainText => "plain",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the preferred format from the request headers.
pub fn detect_format(headers: &HeaderMap) -> Format {
    if let Some(content_type) = header_value(headers, CONTENT_TYPE.as_str()) {
        let mime = content_type.split(';').next().unwrap_or_default().trim();
        return Format::from_mime(mime);
    }

    if let Some(x_format) = header_value(headers, X_FORMAT) {
        return preferred_from_accept(x_format);
    }

    if let Some(accept) = header_value(headers, ACCEPT.as_str()) {
        return preferred_from_accept(accept);
    }

    Format::Unknown
}

/// Weight of 1.0 expressed in thousandths.
const FULL_WEIGHT: u16 = 1000;

/// Pick the best format out of an `Accept`-like header value.
///
/// `text/html, application/xml;q=0.9, */*;q=0.8` → [`Format::Html`]
pub fn preferred_from_accept(value: &str) -> Format {
    let mut entries: Vec<(&str, u16)> = value
        .split(',')
        .filter_map(|segment| {
            let mut parts = segment.split(';');
            let mime = parts.next()?.trim();

            if mime.is_empty() || mime == "*/*" {
                return None;
            }

            Some((mime, weight_of(parts)))
        })
        .collect();

    // sort_by is stable: equal weights keep header order
    entries.sort_by(|a, b| b.1.cmp(&a.1));

    entries
        .first()
        .map_or(Format::Unknown, |(mime, _)| Format::from_mime(mime))
}

/// Weight from the first `q` parameter; other parameters are skipped.
fn weight_of<'a>(params: impl Iterator<Item = &'a str>) -> u16 {
    params
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("q"))
        .map_or(FULL_WEIGHT, |(_, raw)| parse_weight(raw))
}

/// Parse a `q` value, anything broken or out of range is 0.
fn parse_weight(raw: &str) -> u16 {
    match raw.trim().parse::<f32>() {
        Ok(weight) if (0.0..=1.0).contains(&weight) => (weight * FULL_WEIGHT as f32).round() as u16,
        _ => 0,
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

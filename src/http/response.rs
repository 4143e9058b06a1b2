//! Error page responses.
//!
//! # Responsibilities
//! - Carry the outcome of one resolution (status, body, content type)
//! - Attach the headers every error page needs
//!
//! # Design Decisions
//! - The pipeline builds an [`ErrorPage`] without touching axum types beyond
//!   `http` primitives; conversion happens in `IntoResponse`
//! - `X-Robots-Tag: noindex` is set on every page, including failures

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::http::format::Format;
use crate::http::headers::X_ROBOTS_TAG;

/// A fully resolved error page.
#[derive(Debug, Clone)]
pub struct ErrorPage {
    /// HTTP status sent to the client.
    pub status: StatusCode,
    /// Error code the page describes (may differ from `status`).
    pub code: u16,
    /// Representation of `body`.
    pub format: Format,
    pub body: Bytes,
    /// Extra headers (retry hints, proxied request headers).
    pub headers: HeaderMap,
}

impl ErrorPage {
    pub fn new(status: StatusCode, code: u16, format: Format, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            code,
            format,
            body: body.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Plain-text page, used for failures that cannot be templated.
    pub fn plain(status: StatusCode, code: u16, message: impl Into<String>) -> Self {
        Self::new(status, code, Format::PlainText, message.into())
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    /// Body as UTF-8 text, lossy.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        let headers = response.headers_mut();

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(self.format.content_type()));
        headers.insert(HeaderName::from_static(X_ROBOTS_TAG), HeaderValue::from_static("noindex"));
        headers.extend(self.headers);

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_response_headers() {
        let page = ErrorPage::new(StatusCode::SERVICE_UNAVAILABLE, 503, Format::Json, "{}")
            .with_header(header::RETRY_AFTER, HeaderValue::from_static("120"));

        let response = page.into_response();
        let headers = response.headers();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json; charset=utf-8");
        assert_eq!(headers[X_ROBOTS_TAG], "noindex");
        assert_eq!(headers[header::RETRY_AFTER], "120");
    }

    #[test]
    fn test_plain_page() {
        let page = ErrorPage::plain(StatusCode::NOT_FOUND, 999, "nope");
        assert_eq!(page.content_type(), "text/plain; charset=utf-8");
        assert_eq!(page.text(), "nope");
    }
}

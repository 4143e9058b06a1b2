//! Values available to a template render.

use tera::Context;

use crate::http::request::RequestDetails;

/// The full named-value set passed into one render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RenderProperties {
    pub code: u16,
    pub message: String,
    pub description: String,
    pub original_uri: String,
    pub namespace: String,
    pub ingress_name: String,
    pub service_name: String,
    pub service_port: String,
    pub request_id: String,
    pub forwarded_for: String,
    pub host: String,
    pub show_details: bool,
    pub l10n_disabled: bool,
}

impl RenderProperties {
    pub fn new(code: u16, message: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Attach request details.
    pub fn with_details(mut self, details: RequestDetails) -> Self {
        self.original_uri = details.original_uri;
        self.namespace = details.namespace;
        self.ingress_name = details.ingress_name;
        self.service_name = details.service_name;
        self.service_port = details.service_port;
        self.request_id = details.request_id;
        self.forwarded_for = details.forwarded_for;
        self.host = details.host;
        self
    }

    /// Template variables, one per property token.
    pub fn to_context(&self) -> Context {
        let mut ctx = Context::new();

        ctx.insert("code", &self.code);
        ctx.insert("message", &self.message);
        ctx.insert("description", &self.description);
        ctx.insert("original_uri", &self.original_uri);
        ctx.insert("namespace", &self.namespace);
        ctx.insert("ingress_name", &self.ingress_name);
        ctx.insert("service_name", &self.service_name);
        ctx.insert("service_port", &self.service_port);
        ctx.insert("request_id", &self.request_id);
        ctx.insert("forwarded_for", &self.forwarded_for);
        ctx.insert("host", &self.host);
        ctx.insert("show_details", &self.show_details);
        ctx.insert("l10n_disabled", &self.l10n_disabled);

        // inverted flags, handy in `{% if hide_details %}`
        ctx.insert("hide_details", &!self.show_details);
        ctx.insert("l10n_enabled", &!self.l10n_disabled);

        ctx
    }

    /// Stable byte layout used for cache keys.
    ///
    /// Fields are written in declaration order: the code as big-endian u16,
    /// each string as a big-endian u32 length followed by its UTF-8 bytes,
    /// each flag as a single byte.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let strings = [
            &self.message,
            &self.description,
            &self.original_uri,
            &self.namespace,
            &self.ingress_name,
            &self.service_name,
            &self.service_port,
            &self.request_id,
            &self.forwarded_for,
            &self.host,
        ];

        let capacity = 2 + 2 + strings.iter().map(|s| 4 + s.len()).sum::<usize>();
        let mut out = Vec::with_capacity(capacity);

        out.extend_from_slice(&self.code.to_be_bytes());
        for s in strings {
            out.extend_from_slice(&(s.len() as u32).to_be_bytes());
            out.extend_from_slice(s.as_bytes());
        }
        out.push(u8::from(self.show_details));
        out.push(u8::from(self.l10n_disabled));

        out
    }
}

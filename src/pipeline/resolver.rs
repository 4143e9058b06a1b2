use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::StatusCode;
use bytes::Bytes;

use crate::codes::{defaults::default_codes, CodeDescription, CodeTable};
use crate::config::{load_templates, AppConfig, ConfigError, FormatsConfig, ValidationError};
use crate::http::format::{detect_format, Format};
use crate::http::request::{code_from_headers, code_from_path, RequestDetails};
use crate::http::response::ErrorPage;
use crate::observability::metrics;
use crate::template::{
    Minifier, RenderProperties, RenderedPageCache, Renderer, RotationMode, TemplatePicker, TemplateSet,
};

/// Templates for the non-HTML representations. `None` means "serve HTML".
#[derive(Debug, Clone, Default)]
pub struct Formats {
    pub json: Option<String>,
    pub xml: Option<String>,
    pub plain: Option<String>,
}

impl Formats {
    /// Template for `format`, if one is configured and non-empty.
    pub fn get(&self, format: Format) -> Option<&str> {
        let source = match format {
            Format::Json => self.json.as_deref(),
            Format::Xml => self.xml.as_deref(),
            Format::PlainText => self.plain.as_deref(),
            Format::Html | Format::Unknown => None,
        };

        source.filter(|s| !s.is_empty())
    }
}

impl From<&FormatsConfig> for Formats {
    fn from(config: &FormatsConfig) -> Self {
        Self {
            json: config.json.clone(),
            xml: config.xml.clone(),
            plain: config.plain.clone(),
        }
    }
}

/// Per-request behaviour switches.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub default_code: u16,
    pub respond_with_same_code: bool,
    pub show_details: bool,
    pub disable_l10n: bool,
    /// `Retry-After` seconds for 5xx pages, `None` to omit.
    pub retry_after: Option<u64>,
    pub proxy_headers: Vec<HeaderName>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            default_code: 404,
            respond_with_same_code: false,
            show_details: false,
            disable_l10n: false,
            retry_after: None,
            proxy_headers: Vec::new(),
        }
    }
}

/// Turns an error signal into a rendered [`ErrorPage`].
#[derive(Debug)]
pub struct Pipeline {
    codes: CodeTable,
    templates: TemplateSet,
    formats: Formats,
    picker: TemplatePicker,
    renderer: Renderer,
    cache: Option<Arc<RenderedPageCache>>,
    minifier: Option<Minifier>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        codes: CodeTable,
        templates: TemplateSet,
        formats: Formats,
        picker: TemplatePicker,
        renderer: Renderer,
        cache: Option<Arc<RenderedPageCache>>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            codes,
            templates,
            formats,
            picker,
            renderer,
            cache,
            minifier: None,
            options,
        }
    }

    /// Minify HTML pages before they are cached and sent.
    pub fn with_minifier(mut self, minifier: Minifier) -> Self {
        self.minifier = Some(minifier);
        self
    }

    /// Build the pipeline from a validated configuration.
    ///
    /// Reads template files, so call it before serving starts.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let rendering = &config.rendering;

        let mut codes = default_codes();
        codes.extend(config.codes.iter().map(|(k, v)| (k.clone(), v.clone())));

        let templates = load_templates(config)?;

        let mode: RotationMode = rendering.rotation_mode.parse().map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidRotationMode {
                value: rendering.rotation_mode.clone(),
                expected: RotationMode::ALL.map(|m| m.as_str()).join(", "),
            }])
        })?;

        if mode == RotationMode::Disabled && !templates.contains(&rendering.template_name) {
            return Err(ConfigError::Validation(vec![ValidationError::UnknownTemplate {
                name: rendering.template_name.clone(),
            }]));
        }

        let picker = TemplatePicker::new(mode, templates.names(), rendering.template_name.clone());

        let cache = (rendering.cache_ttl_secs > 0)
            .then(|| Arc::new(RenderedPageCache::new(Duration::from_secs(rendering.cache_ttl_secs))));

        let proxy_headers = rendering
            .proxy_headers
            .iter()
            .map(|name| {
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                    ConfigError::Validation(vec![ValidationError::InvalidProxyHeader { name: name.clone() }])
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let options = PipelineOptions {
            default_code: rendering.default_code,
            respond_with_same_code: rendering.respond_with_same_code,
            show_details: rendering.show_details,
            disable_l10n: rendering.disable_l10n,
            retry_after: (rendering.retry_after_secs > 0).then_some(rendering.retry_after_secs),
            proxy_headers,
        };

        tracing::info!(
            templates = templates.len(),
            codes = codes.len(),
            rotation_mode = %mode,
            template = %rendering.template_name,
            cache_ttl_secs = rendering.cache_ttl_secs,
            minify = rendering.minify,
            "Pipeline ready"
        );

        let pipeline = Self::new(
            codes,
            templates,
            Formats::from(&config.formats),
            picker,
            Renderer::new(),
            cache,
            options,
        );

        Ok(if rendering.minify {
            pipeline.with_minifier(Minifier::new())
        } else {
            pipeline
        })
    }

    pub fn codes(&self) -> &CodeTable {
        &self.codes
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn minifier(&self) -> Option<&Minifier> {
        self.minifier.as_ref()
    }

    /// Shared handle on the page cache, `None` when caching is off.
    pub fn cache(&self) -> Option<Arc<RenderedPageCache>> {
        self.cache.clone()
    }

    /// Resolve one request into a page.
    pub fn resolve(&self, path: &str, headers: &HeaderMap) -> ErrorPage {
        let start = Instant::now();

        let code = code_from_path(path)
            .or_else(|| code_from_headers(headers))
            .unwrap_or(self.options.default_code);

        let page = self.resolve_code(code, headers);

        metrics::record_request(page.format, page.status.as_u16(), start);
        tracing::debug!(
            path,
            code,
            status = page.status.as_u16(),
            format = %page.format,
            "Error page resolved"
        );

        page
    }

    /// Resolve a page for an already known code.
    pub fn resolve_code(&self, code: u16, headers: &HeaderMap) -> ErrorPage {
        let Some(description) = self.describe(code) else {
            return ErrorPage::plain(
                StatusCode::NOT_FOUND,
                code,
                format!("requested code ({code}) not configured"),
            );
        };

        let status = if self.options.respond_with_same_code {
            StatusCode::from_u16(code).unwrap_or(StatusCode::OK)
        } else {
            StatusCode::OK
        };

        let mut props = RenderProperties::new(code, description.message, description.description);
        props.show_details = self.options.show_details;
        props.l10n_disabled = self.options.disable_l10n;
        if self.options.show_details {
            props = props.with_details(RequestDetails::from_headers(headers));
        }

        let requested = detect_format(headers);
        let page = match self.formats.get(requested) {
            Some(source) => self.render_page(status, requested, source, &props),
            None => self.render_html(status, &props),
        };

        self.decorate(page, headers)
    }

    /// Code description, falling back to the standard reason phrase.
    fn describe(&self, code: u16) -> Option<CodeDescription> {
        if let Some(found) = self.codes.find(code) {
            return Some(found.clone());
        }

        StatusCode::from_u16(code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .map(|reason| CodeDescription::new(reason, ""))
    }

    fn render_html(&self, status: StatusCode, props: &RenderProperties) -> ErrorPage {
        let Some(name) = self.picker.pick() else {
            tracing::error!(mode = %self.picker.mode(), "No template to pick from");
            return ErrorPage::plain(StatusCode::INTERNAL_SERVER_ERROR, props.code, "no templates available");
        };

        match self.templates.get(&name) {
            Some(source) => self.render_page(status, Format::Html, source, props),
            None => {
                tracing::error!(template = %name, "Picked template is not registered");
                ErrorPage::plain(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    props.code,
                    format!("template {name} not exists"),
                )
            }
        }
    }

    fn render_page(&self, status: StatusCode, format: Format, source: &str, props: &RenderProperties) -> ErrorPage {
        if let Some(body) = self.cache.as_ref().and_then(|cache| cache.get(source, props)) {
            metrics::record_cache_hit();
            return ErrorPage::new(status, props.code, format, body);
        }

        match self.renderer.render(source, props) {
            Ok(rendered) => {
                let rendered = match (&self.minifier, format) {
                    (Some(minifier), Format::Html) => minifier.minify(&rendered),
                    _ => rendered,
                };
                let body = Bytes::from(rendered);
                if let Some(cache) = &self.cache {
                    metrics::record_cache_miss();
                    cache.put(source, props, body.clone());
                }
                ErrorPage::new(status, props.code, format, body)
            }
            Err(err) => {
                tracing::warn!(code = props.code, format = %format, error = %err, "Template render failed");
                metrics::record_render_failure(format);
                ErrorPage::plain(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    props.code,
                    format!("cannot render {} template: {err}", format.as_str().to_uppercase()),
                )
            }
        }
    }

    /// Retry hint and proxied request headers.
    fn decorate(&self, mut page: ErrorPage, request: &HeaderMap) -> ErrorPage {
        if let Some(secs) = self.options.retry_after {
            if (500..600).contains(&page.code) {
                page.headers.insert(header::RETRY_AFTER, HeaderValue::from(secs));
            }
        }

        for name in &self.options.proxy_headers {
            if let Some(value) = request.get(name).filter(|v| !v.is_empty()) {
                page.headers.insert(name.clone(), value.clone());
            }
        }

        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemplateConfig;
    use crate::http::headers::{X_CODE, X_FORMAT, X_REQUEST_ID};

    fn config_with(template: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.templates.push(TemplateConfig::inline("test", template));
        config.rendering.template_name = "test".into();
        config
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        pairs
            .iter()
            .map(|(k, v)| (HeaderName::from_static(k), HeaderValue::from_static(v)))
            .collect()
    }

    #[test]
    fn test_code_from_path() {
        let pipeline = Pipeline::from_config(&config_with("{{code}}: {{message}}")).unwrap();
        let page = pipeline.resolve("/404.html", &HeaderMap::new());

        assert_eq!(page.status, StatusCode::OK);
        assert_eq!(page.format, Format::Html);
        assert_eq!(page.text(), "404: Not Found");
    }

    #[test]
    fn test_code_sources_priority() {
        let pipeline = Pipeline::from_config(&config_with("{{ code }}")).unwrap();

        let h = headers(&[(X_CODE, "502")]);
        assert_eq!(pipeline.resolve("/401", &h).text(), "401");
        assert_eq!(pipeline.resolve("/", &h).text(), "502");
        assert_eq!(pipeline.resolve("/foo", &h).text(), "502");
        assert_eq!(pipeline.resolve("/foo", &headers(&[(X_CODE, "abc")])).text(), "404");
        assert_eq!(pipeline.resolve("/0", &HeaderMap::new()).text(), "404");
    }

    #[test]
    fn test_same_code_json() {
        let mut config = config_with("{{ code }}");
        config.rendering.respond_with_same_code = true;
        let pipeline = Pipeline::from_config(&config).unwrap();

        let page = pipeline.resolve("/", &headers(&[(X_CODE, "503"), ("accept", "application/json")]));
        assert_eq!(page.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(page.content_type(), "application/json; charset=utf-8");
        assert!(page.text().contains("\"503\""));
        assert!(page.text().contains("Service Unavailable"));
    }

    #[test]
    fn test_wildcard_and_fallback_descriptions() {
        let mut config = config_with("{{ message }}|{{ description }}");
        config.codes.insert("5xx".into(), CodeDescription::new("Server trouble", "Later"));
        let pipeline = Pipeline::from_config(&config).unwrap();

        // exact default entry beats the wildcard
        assert_eq!(
            pipeline.resolve("/500", &HeaderMap::new()).text(),
            "Internal Server Error|The server met an unexpected condition"
        );
        assert_eq!(pipeline.resolve("/599", &HeaderMap::new()).text(), "Server trouble|Later");
        // not in the table, but a known status
        assert_eq!(pipeline.resolve("/302", &HeaderMap::new()).text(), "Found|");
    }

    #[test]
    fn test_unknown_code_is_not_configured() {
        let pipeline = Pipeline::from_config(&config_with("{{ code }}")).unwrap();
        let page = pipeline.resolve("/999", &HeaderMap::new());

        assert_eq!(page.status, StatusCode::NOT_FOUND);
        assert_eq!(page.format, Format::PlainText);
        assert_eq!(page.text(), "requested code (999) not configured");
    }

    #[test]
    fn test_render_error_is_500() {
        let pipeline = Pipeline::from_config(&config_with("{{ nope() }}")).unwrap();
        let page = pipeline.resolve("/404", &HeaderMap::new());

        assert_eq!(page.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(page.text().starts_with("cannot render HTML template: "), "{}", page.text());
        assert!(pipeline.cache().unwrap().is_empty());
    }

    #[test]
    fn test_unregistered_template_is_500() {
        let templates: TemplateSet = [("a", "{{ code }}")].into_iter().collect();
        let pipeline = Pipeline::new(
            default_codes(),
            templates,
            Formats::default(),
            TemplatePicker::new(RotationMode::Disabled, vec!["a".into()], "ghost"),
            Renderer::with_hostname("h"),
            None,
            PipelineOptions::default(),
        );

        let page = pipeline.resolve("/404", &HeaderMap::new());
        assert_eq!(page.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(page.text(), "template ghost not exists");
    }

    #[test]
    fn test_unknown_fixed_template_rejected_at_build() {
        let mut config = AppConfig::default();
        config.rendering.template_name = "ghost".into();
        assert!(matches!(Pipeline::from_config(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_disabled_format_falls_back_to_html() {
        let mut config = config_with("html {{ code }}");
        config.formats.xml = Some(String::new());
        config.formats.json = None;
        let pipeline = Pipeline::from_config(&config).unwrap();

        let page = pipeline.resolve("/404", &headers(&[(X_FORMAT, "application/xml")]));
        assert_eq!(page.format, Format::Html);
        assert_eq!(page.text(), "html 404");

        let page = pipeline.resolve("/404", &headers(&[("accept", "text/plain")]));
        assert_eq!(page.format, Format::PlainText);
        assert!(page.text().starts_with("Error 404: Not Found"));
    }

    #[test]
    fn test_details_only_when_enabled() {
        let h = headers(&[(X_REQUEST_ID, "abc-123")]);

        let pipeline = Pipeline::from_config(&config_with("[{{ request_id }}]")).unwrap();
        assert_eq!(pipeline.resolve("/404", &h).text(), "[]");

        let mut config = config_with("[{{ request_id }}]");
        config.rendering.show_details = true;
        let pipeline = Pipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.resolve("/404", &h).text(), "[abc-123]");
    }

    #[test]
    fn test_headers_decoration() {
        let mut config = config_with("{{ code }}");
        config.rendering.retry_after_secs = 30;
        config.rendering.proxy_headers = vec!["x-request-id".into(), "x-absent".into()];
        let pipeline = Pipeline::from_config(&config).unwrap();
        let h = headers(&[(X_REQUEST_ID, "abc")]);

        let page = pipeline.resolve("/503", &h);
        assert_eq!(page.headers[header::RETRY_AFTER], "30");
        assert_eq!(page.headers[X_REQUEST_ID], "abc");
        assert!(!page.headers.contains_key("x-absent"));

        let page = pipeline.resolve("/404", &h);
        assert!(!page.headers.contains_key(header::RETRY_AFTER));
    }

    #[test]
    fn test_retry_after_on_by_default() {
        let pipeline = Pipeline::from_config(&config_with("{{ code }}")).unwrap();
        let page = pipeline.resolve("/502", &HeaderMap::new());
        assert_eq!(page.headers[header::RETRY_AFTER], "120");

        let mut config = config_with("{{ code }}");
        config.rendering.retry_after_secs = 0;
        let pipeline = Pipeline::from_config(&config).unwrap();
        assert!(!pipeline.resolve("/502", &HeaderMap::new()).headers.contains_key(header::RETRY_AFTER));
    }

    #[test]
    fn test_cache_is_populated_and_reused() {
        let pipeline = Pipeline::from_config(&config_with("{{ code }}")).unwrap();
        let cache = pipeline.cache().unwrap();

        assert_eq!(pipeline.resolve("/404", &HeaderMap::new()).text(), "404");
        assert_eq!(cache.len(), 1);
        assert_eq!(pipeline.resolve("/404", &HeaderMap::new()).text(), "404");
        assert_eq!(cache.len(), 1);
        pipeline.resolve("/500", &HeaderMap::new());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let mut config = config_with("{{ code }}");
        config.rendering.cache_ttl_secs = 0;
        let pipeline = Pipeline::from_config(&config).unwrap();

        assert!(pipeline.cache().is_none());
        assert_eq!(pipeline.resolve("/404", &HeaderMap::new()).text(), "404");
    }

    const SPACED_PAGE: &str = "<html>\n  <body>\n    <!-- page -->\n    <h1>\n      {{ code }}\n    </h1>\n  </body>\n</html>\n";

    #[test]
    fn test_html_is_minified_before_caching() {
        let pipeline = Pipeline::from_config(&config_with(SPACED_PAGE)).unwrap();
        assert!(pipeline.minifier().is_some());

        let page = pipeline.resolve("/404", &HeaderMap::new());
        let html = page.text();
        assert_eq!(page.format, Format::Html);
        assert!(html.contains("404"));
        assert!(!html.contains("<!-- page -->"));
        assert!(!html.contains('\n'), "{html}");
        assert!(html.len() < SPACED_PAGE.len());

        // second hit is served from the cache, already minified
        assert_eq!(pipeline.cache().unwrap().len(), 1);
        assert_eq!(pipeline.resolve("/404", &HeaderMap::new()).text(), html);
    }

    #[test]
    fn test_other_formats_are_not_minified() {
        let pipeline = Pipeline::from_config(&config_with(SPACED_PAGE)).unwrap();

        let json = pipeline.resolve("/404", &headers(&[("accept", "application/json")]));
        assert_eq!(json.format, Format::Json);
        assert!(json.text().contains("{\n  \"error\": true,\n"), "{}", json.text());

        let xml = pipeline.resolve("/404", &headers(&[("accept", "application/xml")]));
        assert_eq!(xml.format, Format::Xml);
        assert!(xml.text().contains("<error>\n  <code>404</code>"), "{}", xml.text());

        let plain = pipeline.resolve("/500", &headers(&[("accept", "text/plain")]));
        assert_eq!(plain.format, Format::PlainText);
        assert!(plain.text().starts_with("Error 500: Internal Server Error\n"), "{}", plain.text());
    }

    #[test]
    fn test_minify_switch_off_keeps_html_as_rendered() {
        let mut config = config_with(SPACED_PAGE);
        config.rendering.minify = false;
        let pipeline = Pipeline::from_config(&config).unwrap();
        assert!(pipeline.minifier().is_none());

        let html = pipeline.resolve("/404", &HeaderMap::new()).text();
        assert!(html.contains("<!-- page -->"));
        assert!(html.contains("<h1>\n      404\n    </h1>"), "{html}");
    }
}

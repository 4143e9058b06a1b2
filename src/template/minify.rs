//! HTML minification of rendered pages.
//!
//! Inline `<style>` and `<script>` blocks are minified too. Document tags
//! (`<html>`, `<head>`) and closing tags are kept so pages stay valid for
//! picky clients.

use std::fmt;

use minify_html::{minify, Cfg};

/// Minifier built once at startup and shared by every render.
pub struct Minifier {
    cfg: Cfg,
}

impl Minifier {
    pub fn new() -> Self {
        let mut cfg = Cfg::new();
        cfg.minify_css = true;
        cfg.minify_js = true;
        cfg.keep_closing_tags = true;
        cfg.keep_html_and_head_opening_tags = true;
        cfg.do_not_minify_doctype = true;

        Self { cfg }
    }

    pub fn minify(&self, html: &str) -> String {
        let out = minify(html.as_bytes(), &self.cfg);
        String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }
}

impl Default for Minifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Minifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Minifier").finish_non_exhaustive()
    }
}

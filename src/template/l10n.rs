//! Embedded client-side localization script.

const SCRIPT: &str = include_str!("../../assets/l10n.js");

/// JavaScript that translates `data-l10n` elements in the browser.
pub fn script() -> &'static str {
    SCRIPT
}

//! Pattern table lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Display text for one status entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CodeDescription {
    /// Short description ("Not Found").
    pub message: String,

    /// Longer, human friendly explanation.
    pub description: String,
}

impl CodeDescription {
    pub fn new(message: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            description: description.into(),
        }
    }
}

/// Mapping of code patterns ("404", "4xx", "5**") to their descriptions.
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    entries: BTreeMap<String, CodeDescription>,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the description for a pattern.
    pub fn insert(&mut self, pattern: impl Into<String>, description: CodeDescription) {
        self.entries.insert(pattern.into(), description);
    }

    /// Find the closest description for the given code.
    ///
    /// An exact entry always wins. Otherwise only patterns with the same
    /// length as the decimal code are considered, and the one using the
    /// fewest wildcard positions is returned.
    pub fn find(&self, code: u16) -> Option<&CodeDescription> {
        if self.entries.is_empty() {
            return None;
        }

        let code = code.to_string();

        if let Some(desc) = self.entries.get(&code) {
            return Some(desc);
        }

        let code_chars: Vec<char> = code.chars().collect();
        let mut best: Option<(usize, &CodeDescription)> = None;

        for (pattern, desc) in &self.entries {
            let pattern_chars: Vec<char> = pattern.chars().collect();

            if pattern_chars.len() != code_chars.len() || !matches_digit(pattern_chars[0], code_chars[0]) {
                continue;
            }

            let Some(wildcards) = wildcard_match(&pattern_chars, &code_chars) else {
                continue;
            };

            // strict comparison keeps the first (lowest) pattern on ties
            if best.map_or(true, |(count, _)| wildcards < count) {
                best = Some((wildcards, desc));
            }
        }

        best.map(|(_, desc)| desc)
    }

    /// Description stored under the exact pattern.
    pub fn get(&self, pattern: &str) -> Option<&CodeDescription> {
        self.entries.get(pattern)
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.entries.contains_key(pattern)
    }

    /// All patterns, sorted.
    pub fn codes(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CodeDescription)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CodeDescription)> for CodeTable {
    fn from_iter<I: IntoIterator<Item = (K, CodeDescription)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Extend<(String, CodeDescription)> for CodeTable {
    fn extend<I: IntoIterator<Item = (String, CodeDescription)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

fn is_wildcard(c: char) -> bool {
    matches!(c, '*' | 'x' | 'X')
}

fn matches_digit(pattern: char, code: char) -> bool {
    is_wildcard(pattern) || pattern == code
}

/// Number of wildcard positions used, or `None` when a literal differs.
fn wildcard_match(pattern: &[char], code: &[char]) -> Option<usize> {
    let mut wildcards = 0;

    for (p, c) in pattern.iter().zip(code) {
        if is_wildcard(*p) {
            wildcards += 1;
        } else if p != c {
            return None;
        }
    }

    Some(wildcards)
}

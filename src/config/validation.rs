//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (template name refers to a known template)
//! - Validate value ranges (default code 1..=999, parseable addresses)
//! - Keep template names usable as a single directory name for `build`
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;
use crate::template::{builtin, RotationMode};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("template #{index}: needs a name, content or path")]
    EmptyTemplate { index: usize },

    #[error("template #{index}: name is empty")]
    EmptyTemplateName { index: usize },

    #[error("template name {name:?} must not contain path separators or \"..\"")]
    InvalidTemplateName { name: String },

    #[error("template {name:?} is declared more than once")]
    DuplicateTemplate { name: String },

    #[error("code pattern {pattern:?} must be non-empty and contain no whitespace")]
    InvalidCodePattern { pattern: String },

    #[error("default code {code} is out of range 1..=999")]
    InvalidDefaultCode { code: u16 },

    #[error("rotation mode {value:?} is not one of {expected}")]
    InvalidRotationMode { value: String, expected: String },

    #[error("template {name:?} is not defined")]
    UnknownTemplate { name: String },

    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("log format {value:?} must be \"text\" or \"json\"")]
    InvalidLogFormat { value: String },

    #[error("proxy header {name:?} is not a valid header name")]
    InvalidProxyHeader { name: String },
}

/// Validate configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut names: HashSet<&str> = builtin::TEMPLATES.iter().map(|(name, _)| *name).collect();
    let mut declared = HashSet::new();

    for (index, template) in config.templates.iter().enumerate() {
        if template.content.is_none() && template.path.is_none() {
            errors.push(ValidationError::EmptyTemplate { index });
            continue;
        }

        if template.name.trim().is_empty() {
            // file templates get their name from the file stem
            if template.path.is_none() {
                errors.push(ValidationError::EmptyTemplateName { index });
            }
            continue;
        }

        if !is_safe_template_name(&template.name) {
            errors.push(ValidationError::InvalidTemplateName {
                name: template.name.clone(),
            });
            continue;
        }

        if !declared.insert(template.name.as_str()) {
            errors.push(ValidationError::DuplicateTemplate {
                name: template.name.clone(),
            });
        }
        names.insert(template.name.as_str());
    }

    for pattern in config.codes.keys() {
        if pattern.is_empty() || pattern.chars().any(char::is_whitespace) {
            errors.push(ValidationError::InvalidCodePattern {
                pattern: pattern.clone(),
            });
        }
    }

    let rendering = &config.rendering;

    if !(1..=999).contains(&rendering.default_code) {
        errors.push(ValidationError::InvalidDefaultCode {
            code: rendering.default_code,
        });
    }

    match rendering.rotation_mode.parse::<RotationMode>() {
        Ok(RotationMode::Disabled) => {
            // unnamed file templates are only known after loading, so a miss
            // here is reported only when every template has an explicit name
            let all_named = config.templates.iter().all(|t| !t.name.trim().is_empty());
            if all_named && !names.contains(rendering.template_name.as_str()) {
                errors.push(ValidationError::UnknownTemplate {
                    name: rendering.template_name.clone(),
                });
            }
        }
        Ok(_) => {}
        Err(_) => errors.push(ValidationError::InvalidRotationMode {
            value: rendering.rotation_mode.clone(),
            expected: RotationMode::ALL.map(|m| m.as_str()).join(", "),
        }),
    }

    for name in &rendering.proxy_headers {
        if axum::http::HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidProxyHeader { name: name.clone() });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    let observability = &config.observability;

    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }

    if !matches!(observability.log_format.as_str(), "text" | "json") {
        errors.push(ValidationError::InvalidLogFormat {
            value: observability.log_format.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Template names become directories under the `build` output.
fn is_safe_template_name(name: &str) -> bool {
    name != "." && !name.contains("..") && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::CodeDescription;
    use crate::config::schema::TemplateConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.rendering.default_code = 0;
        config.rendering.rotation_mode = "weekly".into();
        config.observability.log_format = "xml".into();
        config.codes.insert("4 x".into(), CodeDescription::default());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5, "{errors:?}");
        assert!(errors.contains(&ValidationError::InvalidDefaultCode { code: 0 }));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidRotationMode { .. })));
    }

    #[test]
    fn test_template_checks() {
        let mut config = AppConfig::default();
        config.templates = vec![
            TemplateConfig::inline("a", "x"),
            TemplateConfig::inline("a", "y"),
            TemplateConfig::inline("", "z"),
            TemplateConfig::default(),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::DuplicateTemplate { name: "a".into() },
                ValidationError::EmptyTemplateName { index: 2 },
                ValidationError::EmptyTemplate { index: 3 },
            ]
        );
    }

    #[test]
    fn test_unknown_fixed_template() {
        let mut config = AppConfig::default();
        config.rendering.template_name = "missing".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::UnknownTemplate { name: "missing".into() }])
        );

        // any template name is fine once rotation picks among all of them
        config.rendering.rotation_mode = "random-daily".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_configured_template_can_be_fixed() {
        let mut config = AppConfig::default();
        config.templates.push(TemplateConfig::inline("mine", "{{ code }}"));
        config.rendering.template_name = "mine".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_template_names_cannot_escape_output_dir() {
        for name in ["../evil", "a/b", "a\\b", "..", ".", "/abs", "x..y"] {
            let mut config = AppConfig::default();
            config.templates.push(TemplateConfig::inline(name, "{{ code }}"));

            assert_eq!(
                validate_config(&config),
                Err(vec![ValidationError::InvalidTemplateName { name: name.into() }]),
                "{name}"
            );
        }

        let mut config = AppConfig::default();
        config.templates.push(TemplateConfig::inline("my.page-v2", "{{ code }}"));
        assert_eq!(validate_config(&config), Ok(()));
    }
}

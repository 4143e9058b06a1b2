//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{AppConfig, TemplateConfig};
use crate::config::validation::ValidationError;
use crate::template::TemplateSet;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("template #{index} has neither content nor a path")]
    MissingTemplateSource { index: usize },

    #[error("no templates available")]
    NoTemplates,
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file.
///
/// Relative template paths are resolved against the directory holding the
/// file, and file templates without a name are named after their file stem.
/// The result is not validated: command-line overrides are applied first,
/// then the caller runs [`validate_config`](crate::config::validate_config) once.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let config = parse_config(&content, base_dir)?;

    tracing::debug!(
        path = %path.display(),
        templates = config.templates.len(),
        codes = config.codes.len(),
        "Configuration file loaded"
    );

    Ok(config)
}

/// Parse configuration text; relative paths resolve against `base_dir`.
pub fn parse_config(content: &str, base_dir: &Path) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig = toml::from_str(content)?;

    for template in &mut config.templates {
        if let Some(path) = template.path.as_mut() {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        }

        if template.name.trim().is_empty() {
            if let Some(stem) = template_stem(template) {
                template.name = stem;
            }
        }
    }

    Ok(config)
}

/// Collect template sources: the built-in set overlaid with configured ones.
///
/// Inline content wins over a path. Fails when a file cannot be read or the
/// resulting set is empty.
pub fn load_templates(config: &AppConfig) -> Result<TemplateSet, ConfigError> {
    let mut set = TemplateSet::builtin();

    for (index, template) in config.templates.iter().enumerate() {
        let source = match (&template.content, &template.path) {
            (Some(content), _) => content.clone(),
            (None, Some(path)) => fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?,
            (None, None) => return Err(ConfigError::MissingTemplateSource { index }),
        };

        let name = if template.name.trim().is_empty() {
            template_stem(template).ok_or(ConfigError::MissingTemplateSource { index })?
        } else {
            template.name.clone()
        };

        tracing::debug!(template = %name, bytes = source.len(), "Template registered");
        set.insert(name, source);
    }

    if set.is_empty() {
        return Err(ConfigError::NoTemplates);
    }

    Ok(set)
}

fn template_stem(template: &TemplateConfig) -> Option<String> {
    template
        .path
        .as_deref()
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
}

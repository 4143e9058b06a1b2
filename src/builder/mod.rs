//! Static error page generation.
//!
//! # Responsibilities
//! - Render every exact code with every template to disk
//! - Write an `index.html` linking the generated pages
//!
//! # Design Decisions
//! - Reuses the serving pipeline's renderer and minifier, so pages match what `serve` returns
//! - Wildcard patterns are skipped, they have no single file name
//! - Request details are never rendered into static files

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::pipeline::Pipeline;
use crate::template::{RenderError, RenderProperties};

const INDEX_TEMPLATE: &str = include_str!("../../assets/index.html");

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template {template:?}, code {code}: {source}")]
    Render {
        template: String,
        code: String,
        #[source]
        source: RenderError,
    },

    #[error("index page: {0}")]
    Index(#[from] tera::Error),
}

/// One generated file, as listed in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageEntry {
    pub code: String,
    pub message: String,
    /// Path relative to the output directory.
    pub path: String,
}

/// Summary of a build run.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Generated pages, by template name.
    pub pages: BTreeMap<String, Vec<PageEntry>>,
}

impl BuildReport {
    pub fn page_count(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }
}

/// Render all pages into `out_dir`, plus `index.html` when `with_index` is set.
pub fn build_pages(pipeline: &Pipeline, out_dir: &Path, with_index: bool) -> Result<BuildReport, BuildError> {
    create_dir(out_dir)?;

    let codes: Vec<(u16, &str, _)> = pipeline
        .codes()
        .iter()
        .filter_map(|(pattern, desc)| {
            if !pattern.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let code = pattern.parse::<u16>().ok()?;
            Some((code, pattern, desc))
        })
        .collect();

    let mut report = BuildReport::default();

    for (template, source) in pipeline.templates().iter() {
        let dir = out_dir.join(template);
        create_dir(&dir)?;

        let mut entries = Vec::with_capacity(codes.len());

        for (code, pattern, desc) in &codes {
            let mut props = RenderProperties::new(*code, desc.message.clone(), desc.description.clone());
            props.l10n_disabled = pipeline.options().disable_l10n;

            let content = pipeline
                .renderer()
                .render(source, &props)
                .map_err(|source| BuildError::Render {
                    template: template.to_string(),
                    code: pattern.to_string(),
                    source,
                })?;
            let content = match pipeline.minifier() {
                Some(minifier) => minifier.minify(&content),
                None => content,
            };

            let file_name = format!("{pattern}.html");
            write_file(&dir.join(&file_name), content.as_bytes())?;

            entries.push(PageEntry {
                code: pattern.to_string(),
                message: desc.message.clone(),
                path: format!("{template}/{file_name}"),
            });
        }

        tracing::debug!(template, pages = entries.len(), "Template pages written");
        report.pages.insert(template.to_string(), entries);
    }

    if with_index {
        let mut context = tera::Context::new();
        context.insert("pages", &report.pages);
        let index = tera::Tera::one_off(INDEX_TEMPLATE, &context, false)?;
        write_file(&out_dir.join("index.html"), index.as_bytes())?;
    }

    tracing::info!(
        out_dir = %out_dir.display(),
        templates = report.pages.len(),
        pages = report.page_count(),
        "Error pages built"
    );

    Ok(report)
}

fn create_dir(path: &Path) -> Result<(), BuildError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(BuildError::NotADirectory(path.to_path_buf())),
        Err(_) => fs::create_dir_all(path).map_err(|source| BuildError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_file(path: &Path, content: &[u8]) -> Result<(), BuildError> {
    fs::write(path, content).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}

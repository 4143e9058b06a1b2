//! Command line interface.
//!
//! Every `serve` flag overrides the matching config file value and can also
//! be given through an environment variable.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "error-pages", version)]
#[command(about = "Pretty error pages for reverse proxies", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default)
    Serve(ServeArgs),
    /// Render every page to static files
    Build(BuildArgs),
}

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Address to listen on, e.g. 0.0.0.0:8080
    #[arg(short, long, env = "LISTEN_ADDR")]
    pub listen: Option<String>,

    /// Template used when rotation is disabled
    #[arg(short = 't', long, env = "TEMPLATE_NAME")]
    pub template_name: Option<String>,

    /// disabled, random-on-startup, random-on-each-request, random-daily or random-hourly
    #[arg(long, env = "TEMPLATES_ROTATION_MODE")]
    pub rotation_mode: Option<String>,

    /// Code rendered when the request carries none
    #[arg(long, env = "DEFAULT_ERROR_PAGE")]
    pub default_code: Option<u16>,

    /// Respond with the error code as HTTP status
    #[arg(long, env = "SEND_SAME_HTTP_CODE")]
    pub send_same_code: bool,

    /// Show request details on the pages
    #[arg(long, env = "SHOW_DETAILS")]
    pub show_details: bool,

    /// Disable client-side localization
    #[arg(long, env = "DISABLE_L10N")]
    pub disable_l10n: bool,

    /// Serve HTML pages as rendered, without minification
    #[arg(long, env = "DISABLE_MINIFICATION")]
    pub disable_minification: bool,

    /// Rendered page cache TTL in seconds, 0 disables the cache
    #[arg(long, env = "CACHE_TTL")]
    pub cache_ttl: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log format (text or json)
    #[arg(long, env = "LOG_FORMAT")]
    pub log_format: Option<String>,
}

impl ServeArgs {
    /// Apply the given flags on top of `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        let rendering = &mut config.rendering;

        if let Some(listen) = &self.listen {
            config.listener.bind_address = listen.clone();
        }
        if let Some(name) = &self.template_name {
            rendering.template_name = name.clone();
        }
        if let Some(mode) = &self.rotation_mode {
            rendering.rotation_mode = mode.clone();
        }
        if let Some(code) = self.default_code {
            rendering.default_code = code;
        }
        if let Some(ttl) = self.cache_ttl {
            rendering.cache_ttl_secs = ttl;
        }

        // switches can only turn things on
        rendering.respond_with_same_code |= self.send_same_code;
        rendering.show_details |= self.show_details;
        rendering.disable_l10n |= self.disable_l10n;
        rendering.minify &= !self.disable_minification;

        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.observability.log_format = format.clone();
        }
    }
}

#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Directory the pages are written to
    pub out_dir: PathBuf,

    /// Do not write index.html
    #[arg(long)]
    pub no_index: bool,
}

//! HTTP error page server for reverse proxies and ingress controllers.

pub mod builder;
pub mod cli;
pub mod codes;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod template;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::Pipeline;

//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, health/version routes, layers)
//!     → request.rs (code from path or X-Code, detail headers)
//!     → format.rs (Content-Type / X-Format / Accept negotiation)
//!     → [pipeline renders the page]
//!     → response.rs (status, content type, extra headers)
//!     → Send to client
//! ```

pub mod format;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use format::{detect_format, Format};
pub use response::ErrorPage;
pub use server::{AppState, HttpServer};

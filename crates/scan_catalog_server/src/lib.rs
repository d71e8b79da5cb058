//! HTTP adapter for the scanned-product catalog.
//!
//! Maps JSON requests onto `scan_catalog_core` services and service outcomes
//! onto status codes and `{success, ...}` envelopes.

pub mod config;
pub mod http;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use http::build_router;
pub use state::{AppState, Catalog};

//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`download`] - The download endpoint (POST, CORS preflight, 405 fallback)
//! - [`system`] - Health, capabilities, OpenAPI

mod download;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use download::*;
pub use system::*;

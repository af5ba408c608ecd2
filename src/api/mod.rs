//! Admin API Module
//!
//! Optional JSON endpoints for watching a running proxy.
//!
//! # Endpoints
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_router, serve_admin};

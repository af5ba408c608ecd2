//! Admin API Handlers
//!
//! HTTP request handlers for each admin endpoint.

use axum::{extract::State, Json};

use crate::cache::ResponseCache;
use crate::models::{HealthResponse, StatsResponse};

/// State shared across admin handlers: the same cache the proxy uses.
#[derive(Clone)]
pub struct AdminState {
    pub cache: ResponseCache,
}

impl AdminState {
    pub fn new(cache: ResponseCache) -> Self {
        Self { cache }
    }
}

/// Handler for GET /stats
///
/// Returns current cache statistics, all read from one cache snapshot.
pub async fn stats_handler(State(state): State<AdminState>) -> Json<StatsResponse> {
    let snapshot = state.cache.snapshot().await;
    Json(StatsResponse::new(&snapshot))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

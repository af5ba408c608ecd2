//! Response models for the admin API
//!
//! This module defines the DTOs serialized into admin API response bodies.

pub mod responses;

pub use responses::{HealthResponse, StatsResponse};

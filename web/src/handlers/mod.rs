//! HTTP request handlers shared by every deployment of the service.

pub mod health;

pub use health::{HealthResponse, ReadinessResponse, health_check, readiness};

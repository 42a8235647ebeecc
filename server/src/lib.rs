//! HTTP server for the venue booking platform.
//!
//! Wires the repositories from `venue-booking-postgres` (or any other
//! [`state::Store`]) into an axum router:
//!
//! - [`config`]: environment-driven configuration
//! - [`services`]: use cases with role checks, metrics and notifications
//! - [`api`]: REST handlers
//! - [`routes`]: the router
//! - [`metrics`]: Prometheus counters
//! - [`notify`]: log-based notifier

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod metrics;
pub mod notify;
pub mod routes;
pub mod services;
pub mod state;

pub use config::Config;
pub use routes::build_router;
pub use state::AppState;

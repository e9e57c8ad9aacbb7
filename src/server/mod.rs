//! Axum-based HTTP server for the monitoring proxy.
//!
//! Every request not served locally is forwarded to the configured upstream
//! provider. Requests under the monitored prefix additionally produce a log
//! record that is shipped to the monitoring sink.
//!
//! # Components
//!
//! - `handlers`: Health, metrics and the upstream forwarding fallback.
//! - `middleware`: The interceptor that observes monitored exchanges.
//! - `routes`: Shared state and the router that ties everything together.

mod handlers;
mod middleware;
mod routes;

pub use routes::{build_router, create_router, AppState};

//! In-memory view/click counter.
//!
//! Views arrive over HTTP and are tallied per content category per UTC minute
//! in a [`CounterStore`]. A [`SnapshotPublisher`] periodically persists the
//! whole store to a [`Sink`], and the stats endpoint reads that snapshot back
//! behind a sliding-window [`RateLimiter`].

use axum::{Router, routing::get};
use std::sync::Arc;

pub mod config;
pub mod counter;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod publisher;
pub mod rate_limit;
pub mod simulator;
pub mod sink;
pub mod state;

pub use counter::CounterStore;
pub use error::{AppError, SinkError};
pub use models::{Category, CounterKey, Snapshot, Tally, TimeBucket};
pub use publisher::{PublisherHandle, SnapshotPublisher};
pub use rate_limit::RateLimiter;
pub use simulator::RequestSimulator;
pub use sink::{FileSink, MemorySink, Sink};
pub use state::AppState;

// Build the router with all routes
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::welcome_handler))
        .route("/view", get(handlers::view_handler).post(handlers::view_handler))
        .route("/view/", get(handlers::view_handler).post(handlers::view_handler))
        .route("/stats", get(handlers::stats_handler))
        .route("/stats/", get(handlers::stats_handler))
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state)
}

#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod cache;
pub mod config;
pub mod domain;
pub mod entities;
pub mod error;
pub mod errors;
pub mod infra;
pub mod middleware;
pub mod protocol;
pub mod realtime;
pub mod repos;
pub mod routes;
pub mod services;
pub mod state;
pub mod trace_ctx;


pub use error::AppError;
pub use errors::domain::DomainError;
pub use infra::state::{build_state, StateBuilder};
pub use middleware::{RequestTrace, StructuredLogger};
pub use services::{LeaderboardRequest, RenderedLeaderboard, ScoreRetrievalEngine};
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}

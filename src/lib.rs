//! Library crate for team-bingo-back, exposing modules for binaries and integration tests.

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Runtime configuration loaded from disk and environment.
pub mod config;
/// Persistence layer: store trait, backends and stored documents.
pub mod dao;
/// Request and response bodies.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP route trees.
pub mod routes;
/// Operations behind the routes and background tasks.
pub mod services;
/// Shared application state and board rules.
pub mod state;

/// Build the top-level router and attach cross-cutting middleware layers.
pub fn build_router(state: state::SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

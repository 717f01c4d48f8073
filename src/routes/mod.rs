use axum::Router;

use crate::state::SharedState;

/// Admin page routes.
pub mod admin;
/// Swagger UI.
pub mod docs;
/// Health check route.
pub mod health;
/// Player page routes.
pub mod play;
/// Leaderboard routes.
pub mod ranking;
/// Server-Sent Events routes.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(ranking::router())
        .merge(play::router())
        .merge(admin::router())
        .merge(sse::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::board::TokenQuery,
    error::AppError,
    services::sse_service::{self, EventStream},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/play",
    tag = "sse",
    params(TokenQuery),
    responses(
        (status = 200, description = "Mission and own-player stream", content_type = "text/event-stream", body = String),
        (status = 400, description = "Missing token")
    )
)]
/// Stream mission changes and the caller's own player record.
pub async fn play_stream(
    State(state): State<SharedState>,
    Query(query): Query<TokenQuery>,
) -> Result<EventStream, AppError> {
    let stream = sse_service::subscribe_play(&state, query.token.as_deref()).await?;
    Ok(stream)
}

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "sse",
    responses((status = 200, description = "Stream of every change", content_type = "text/event-stream", body = String))
)]
/// Stream every change to ranking and admin pages.
pub async fn public_stream(State(state): State<SharedState>) -> EventStream {
    sse_service::subscribe_public(&state).await
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/play", get(play_stream))
        .route("/sse/public", get(public_stream))
}

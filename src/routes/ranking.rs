use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::{board::BoardSnapshot, ranking::RankingResponse},
    error::AppError,
    services::ranking_service,
    state::SharedState,
};

/// Leaderboard routes; `/` is the landing page.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(ranking))
        .route("/ranking", get(ranking))
        .route("/ranking/{token}", get(player_board))
}

/// Rank every stored player by the configured metric.
#[utoipa::path(
    get,
    path = "/ranking",
    tag = "ranking",
    responses(
        (status = 200, description = "Current ranking", body = RankingResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn ranking(State(state): State<SharedState>) -> Result<Json<RankingResponse>, AppError> {
    let response = ranking_service::get_ranking(&state).await?;
    Ok(Json(response))
}

/// Read-only board of a ranked player.
#[utoipa::path(
    get,
    path = "/ranking/{token}",
    tag = "ranking",
    params(("token" = String, Path, description = "Player token")),
    responses(
        (status = 200, description = "Player board", body = BoardSnapshot),
        (status = 404, description = "No board stored for this token")
    )
)]
pub async fn player_board(
    State(state): State<SharedState>,
    Path(token): Path<String>,
) -> Result<Json<BoardSnapshot>, AppError> {
    let board = ranking_service::get_board(&state, &token).await?;
    Ok(Json(board))
}

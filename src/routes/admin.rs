use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use axum_valid::Valid;

use crate::{
    dto::{
        admin::{AnswersQuery, AnswersResponse, PlayerLockSummary, PlayersResponse, SetLockRequest},
        mission::MissionBoardDto,
    },
    error::AppError,
    services::admin_service,
    state::SharedState,
};

/// Routes behind the admin pages.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/admin/missions", get(get_missions).put(save_missions))
        .route("/admin/players", get(list_players))
        .route("/admin/players/{token}/lock", put(set_player_lock))
        .route("/admin/answers", get(list_answers))
}

/// Current mission document.
#[utoipa::path(
    get,
    path = "/admin/missions",
    tag = "admin",
    responses((status = 200, description = "Mission document", body = MissionBoardDto))
)]
pub async fn get_missions(
    State(state): State<SharedState>,
) -> Result<Json<MissionBoardDto>, AppError> {
    let missions = admin_service::get_missions(&state).await?;
    Ok(Json(missions))
}

/// Replace the mission document.
#[utoipa::path(
    put,
    path = "/admin/missions",
    tag = "admin",
    request_body = MissionBoardDto,
    responses(
        (status = 200, description = "Missions saved", body = MissionBoardDto),
        (status = 400, description = "Invalid mission document")
    )
)]
pub async fn save_missions(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<MissionBoardDto>>,
) -> Result<Json<MissionBoardDto>, AppError> {
    let missions = admin_service::save_missions(&state, payload).await?;
    Ok(Json(missions))
}

/// Every player with a stored board and its lock flag.
#[utoipa::path(
    get,
    path = "/admin/players",
    tag = "admin",
    responses((status = 200, description = "Stored players", body = PlayersResponse))
)]
pub async fn list_players(
    State(state): State<SharedState>,
) -> Result<Json<PlayersResponse>, AppError> {
    let players = admin_service::list_players(&state).await?;
    Ok(Json(players))
}

/// Lock or unlock a player's board.
#[utoipa::path(
    put,
    path = "/admin/players/{token}/lock",
    tag = "admin",
    params(("token" = String, Path, description = "Player token")),
    request_body = SetLockRequest,
    responses(
        (status = 200, description = "Lock flag updated", body = PlayerLockSummary),
        (status = 404, description = "Unknown player"),
        (status = 409, description = "Stored board cannot be locked")
    )
)]
pub async fn set_player_lock(
    State(state): State<SharedState>,
    Path(token): Path<String>,
    Json(payload): Json<SetLockRequest>,
) -> Result<Json<PlayerLockSummary>, AppError> {
    let summary = admin_service::set_player_lock(&state, &token, payload.locked).await?;
    Ok(Json(summary))
}

/// Submitted answers, optionally filtered by player.
#[utoipa::path(
    get,
    path = "/admin/answers",
    tag = "admin",
    params(AnswersQuery),
    responses((status = 200, description = "Submitted answers", body = AnswersResponse))
)]
pub async fn list_answers(
    State(state): State<SharedState>,
    Query(query): Query<AnswersQuery>,
) -> Result<Json<AnswersResponse>, AppError> {
    let answers = admin_service::list_answers(&state, query.token.as_deref()).await?;
    Ok(Json(answers))
}

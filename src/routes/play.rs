use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        board::{CellValidationResponse, LockBoardRequest, TokenQuery, ValidateCellRequest},
        play::{MissionDetail, PlayerView, SubmitAnswerRequest},
    },
    error::AppError,
    services::player_service,
    state::SharedState,
};

/// Routes behind the player page, all keyed by the `?token=` query parameter.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/play", get(view))
        .route("/play/board/validate", post(validate_cell))
        .route("/play/board/lock", post(lock_board))
        .route("/play/missions/{number}", get(open_mission))
        .route("/play/missions/{number}/answer", post(submit_answer))
        .route("/play/missions/{number}/toggle", post(toggle_completion))
}

/// Own board plus the public missions.
#[utoipa::path(
    get,
    path = "/play",
    tag = "play",
    params(TokenQuery),
    responses(
        (status = 200, description = "Player view", body = PlayerView),
        (status = 400, description = "Missing token")
    )
)]
pub async fn view(
    State(state): State<SharedState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<PlayerView>, AppError> {
    let view = player_service::get_view(&state, query.token.as_deref()).await?;
    Ok(Json(view))
}

/// Check one cell after it lost focus. Duplicates are reported in the body, not as an error.
#[utoipa::path(
    post,
    path = "/play/board/validate",
    tag = "play",
    params(TokenQuery),
    request_body = ValidateCellRequest,
    responses(
        (status = 200, description = "Validation outcome", body = CellValidationResponse),
        (status = 400, description = "Malformed board or missing token")
    )
)]
pub async fn validate_cell(
    Query(query): Query<TokenQuery>,
    Valid(Json(payload)): Valid<Json<ValidateCellRequest>>,
) -> Result<Json<CellValidationResponse>, AppError> {
    let response = player_service::validate_cell(query.token.as_deref(), payload)?;
    Ok(Json(response))
}

/// Lock a full board of distinct numbers.
#[utoipa::path(
    post,
    path = "/play/board/lock",
    tag = "play",
    params(TokenQuery),
    request_body = LockBoardRequest,
    responses(
        (status = 200, description = "Board locked", body = PlayerView),
        (status = 400, description = "Board incomplete or invalid"),
        (status = 409, description = "Board already locked")
    )
)]
pub async fn lock_board(
    State(state): State<SharedState>,
    Query(query): Query<TokenQuery>,
    Valid(Json(payload)): Valid<Json<LockBoardRequest>>,
) -> Result<Json<PlayerView>, AppError> {
    let view = player_service::lock_board(&state, query.token.as_deref(), payload).await?;
    Ok(Json(view))
}

/// Open a public mission on the player's board.
#[utoipa::path(
    get,
    path = "/play/missions/{number}",
    tag = "play",
    params(
        ("number" = u8, Path, description = "Mission number (1..=25)"),
        TokenQuery
    ),
    responses(
        (status = 200, description = "Mission detail", body = MissionDetail),
        (status = 404, description = "Mission is not public"),
        (status = 409, description = "Board is not locked")
    )
)]
pub async fn open_mission(
    State(state): State<SharedState>,
    Path(number): Path<u8>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<MissionDetail>, AppError> {
    let detail = player_service::open_mission(&state, query.token.as_deref(), number).await?;
    Ok(Json(detail))
}

/// Submit the single answer to a mission.
#[utoipa::path(
    post,
    path = "/play/missions/{number}/answer",
    tag = "play",
    params(
        ("number" = u8, Path, description = "Mission number (1..=25)"),
        TokenQuery
    ),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer stored", body = MissionDetail),
        (status = 409, description = "Answer already submitted")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Path(number): Path<u8>,
    Query(query): Query<TokenQuery>,
    Valid(Json(payload)): Valid<Json<SubmitAnswerRequest>>,
) -> Result<Json<MissionDetail>, AppError> {
    let detail =
        player_service::submit_answer(&state, query.token.as_deref(), number, payload).await?;
    Ok(Json(detail))
}

/// Flip a mission between completed and open.
#[utoipa::path(
    post,
    path = "/play/missions/{number}/toggle",
    tag = "play",
    params(
        ("number" = u8, Path, description = "Mission number (1..=25)"),
        TokenQuery
    ),
    responses(
        (status = 200, description = "Completion toggled", body = PlayerView),
        (status = 404, description = "Mission is not public")
    )
)]
pub async fn toggle_completion(
    State(state): State<SharedState>,
    Path(number): Path<u8>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<PlayerView>, AppError> {
    let view = player_service::toggle_completion(&state, query.token.as_deref(), number).await?;
    Ok(Json(view))
}

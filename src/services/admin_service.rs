use tracing::info;

use crate::{
    dao::models::{MissionBoardEntity, PlayerUpdate},
    dto::{
        admin::{AnswersResponse, PlayerLockSummary, PlayersResponse},
        mission::MissionBoardDto,
        play::AnswerSummary,
    },
    error::ServiceError,
    services::{player_service, sse_events},
    state::{SharedState, board::LockedBoard, mission::MissionBoard, session::PlayerToken},
};

/// Full mission document; blank hidden missions when none was ever saved.
pub async fn get_missions(state: &SharedState) -> Result<MissionBoardDto, ServiceError> {
    let store = state.require_store().await?;
    let missions = player_service::load_missions(store.as_ref()).await?;
    Ok(MissionBoardDto::from(&missions))
}

/// Overwrite the mission document and notify subscribers.
pub async fn save_missions(
    state: &SharedState,
    payload: MissionBoardDto,
) -> Result<MissionBoardDto, ServiceError> {
    let store = state.require_store().await?;
    let missions = MissionBoard::from(payload);

    store
        .save_missions(MissionBoardEntity::from(missions.clone()))
        .await?;

    let public = missions.public().count();
    info!(public, "missions saved");
    sse_events::publish_missions(state, &missions);
    Ok(MissionBoardDto::from(&missions))
}

/// Every stored player with its lock flag, ordered by token.
pub async fn list_players(state: &SharedState) -> Result<PlayersResponse, ServiceError> {
    let store = state.require_store().await?;
    let mut players: Vec<PlayerLockSummary> = store
        .list_players()
        .await?
        .into_iter()
        .map(PlayerLockSummary::from)
        .collect();
    players.sort_by(|a, b| a.token.cmp(&b.token));
    Ok(PlayersResponse { players })
}

/// Set a player's lock flag without touching the board or completions.
///
/// Locking is refused when the stored board is not a full board of distinct numbers.
pub async fn set_player_lock(
    state: &SharedState,
    token: &str,
    locked: bool,
) -> Result<PlayerLockSummary, ServiceError> {
    let token = PlayerToken::parse(Some(token))?;
    let store = state.require_store().await?;

    let player = store
        .find_player(token.to_string())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("player `{token}`")))?;

    if locked {
        LockedBoard::try_from(player.board.as_slice()).map_err(|err| {
            ServiceError::InvalidState(format!("cannot lock board of `{token}`: {err}"))
        })?;
    }

    if !store
        .update_player(token.to_string(), PlayerUpdate::Locked(locked))
        .await?
    {
        return Err(ServiceError::NotFound(format!("player `{token}`")));
    }
    info!(token = %token, locked, "player lock flag changed");

    let updated = store
        .find_player(token.to_string())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("player `{token}`")))?;
    let session = player_service::session_from_entity(updated.clone())?;
    sse_events::publish_player(state, &session);

    Ok(PlayerLockSummary::from(updated))
}

/// Submitted answers, oldest first, optionally restricted to one player.
pub async fn list_answers(
    state: &SharedState,
    token: Option<&str>,
) -> Result<AnswersResponse, ServiceError> {
    let filter = token
        .map(|raw| PlayerToken::parse(Some(raw)))
        .transpose()?;
    let store = state.require_store().await?;

    let mut answers = store.list_answers().await?;
    if let Some(filter) = &filter {
        answers.retain(|answer| answer.token == filter.as_str());
    }
    answers.sort_by(|a, b| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a.token.cmp(&b.token))
            .then_with(|| a.mission_number.cmp(&b.mission_number))
    });

    Ok(AnswersResponse {
        answers: answers.into_iter().map(AnswerSummary::from).collect(),
    })
}

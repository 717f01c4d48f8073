use std::time::SystemTime;

use tracing::{info, warn};

use crate::{
    dao::{
        bingo_store::BingoStore,
        models::{AnswerEntity, PlayerEntity, PlayerUpdate},
        storage::StorageError,
    },
    dto::{
        board::{CellValidationResponse, LockBoardRequest, ValidateCellRequest},
        play::{AnswerSummary, MissionDetail, PlayerView, SubmitAnswerRequest},
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        board::{BoardDraft, BoardError},
        mission::MissionBoard,
        session::{PlayerSession, PlayerToken, SessionError},
    },
};

/// Read the mission document, falling back to 25 blank hidden missions.
pub async fn load_missions(store: &dyn BingoStore) -> Result<MissionBoard, ServiceError> {
    Ok(store
        .load_missions()
        .await?
        .map(MissionBoard::from)
        .unwrap_or_else(MissionBoard::blank))
}

/// Read a player document as a session; `None` when the token never locked a board.
pub async fn find_session(
    store: &dyn BingoStore,
    token: &PlayerToken,
) -> Result<Option<PlayerSession>, ServiceError> {
    store
        .find_player(token.to_string())
        .await?
        .map(session_from_entity)
        .transpose()
}

/// Read a player document, or start a fresh editing session.
pub async fn load_session(
    store: &dyn BingoStore,
    token: &PlayerToken,
) -> Result<PlayerSession, ServiceError> {
    Ok(find_session(store, token)
        .await?
        .unwrap_or_else(|| PlayerSession::new(token.clone())))
}

pub(crate) fn session_from_entity(entity: PlayerEntity) -> Result<PlayerSession, ServiceError> {
    let token = entity.token.clone();
    PlayerSession::try_from(entity).map_err(|err| {
        warn!(token = %token, error = %err, "stored player document is invalid");
        ServiceError::Corrupted(format!("player `{token}`: {err}"))
    })
}

/// Player page: own board plus the public missions.
pub async fn get_view(state: &SharedState, token: Option<&str>) -> Result<PlayerView, ServiceError> {
    let token = PlayerToken::parse(token)?;
    let store = state.require_store().await?;
    let missions = load_missions(store.as_ref()).await?;
    let session = load_session(store.as_ref(), &token).await?;
    Ok(PlayerView::new(&session, &missions))
}

/// Blur-time check of one cell; a duplicate is reported in the body and cleared from `cells`.
pub fn validate_cell(
    token: Option<&str>,
    request: ValidateCellRequest,
) -> Result<CellValidationResponse, ServiceError> {
    PlayerToken::parse(token)?;
    let mut draft = BoardDraft::from_raw(&request.cells)?;

    let response = match draft.commit_cell(request.index) {
        Ok(()) => CellValidationResponse {
            valid: true,
            cells: draft.cells().to_vec(),
            message: None,
            available_numbers: Vec::new(),
        },
        Err(
            ref err @ BoardError::DuplicateNumber {
                ref available_numbers,
                ..
            },
        ) => CellValidationResponse {
            valid: false,
            cells: draft.cells().to_vec(),
            message: Some(err.to_string()),
            available_numbers: available_numbers.clone(),
        },
        Err(err) => return Err(err.into()),
    };
    Ok(response)
}

/// Lock the submitted board and persist `{board, locked: true, completed: []}`.
pub async fn lock_board(
    state: &SharedState,
    token: Option<&str>,
    request: LockBoardRequest,
) -> Result<PlayerView, ServiceError> {
    let token = PlayerToken::parse(token)?;
    let draft = BoardDraft::from_raw(&request.cells)?;
    let store = state.require_store().await?;

    let mut session = load_session(store.as_ref(), &token).await?;
    session.lock(&draft)?;
    store.save_player(PlayerEntity::from(&session)).await?;
    info!(token = %token, "board locked");

    sse_events::publish_player(state, &session);
    let missions = load_missions(store.as_ref()).await?;
    Ok(PlayerView::new(&session, &missions))
}

/// Open a public mission sitting on the player's locked board.
pub async fn open_mission(
    state: &SharedState,
    token: Option<&str>,
    number: u8,
) -> Result<MissionDetail, ServiceError> {
    let token = PlayerToken::parse(token)?;
    let store = state.require_store().await?;
    let missions = load_missions(store.as_ref()).await?;
    let session = load_session(store.as_ref(), &token).await?;

    let mission = session.open_mission(&missions, number)?;
    let answer = store.find_answer(token.to_string(), number).await?;

    Ok(MissionDetail {
        number,
        text: mission.text.clone(),
        completed: session.completed().contains(&number),
        answer: answer.map(AnswerSummary::from),
    })
}

/// Store the single answer to a mission and mark it completed.
pub async fn submit_answer(
    state: &SharedState,
    token: Option<&str>,
    number: u8,
    request: SubmitAnswerRequest,
) -> Result<MissionDetail, ServiceError> {
    let token = PlayerToken::parse(token)?;
    let store = state.require_store().await?;
    let missions = load_missions(store.as_ref()).await?;
    let mut session = load_session(store.as_ref(), &token).await?;

    let text = session.open_mission(&missions, number)?.text.clone();
    if store.find_answer(token.to_string(), number).await?.is_some() {
        return Err(SessionError::AlreadySubmitted { number }.into());
    }

    let answer = AnswerEntity {
        token: token.to_string(),
        mission_number: number,
        text: request.text,
        submitted_at: SystemTime::now(),
    };
    match store.insert_answer(answer.clone()).await {
        Ok(()) => {}
        Err(StorageError::AlreadyExists { .. }) => {
            return Err(SessionError::AlreadySubmitted { number }.into());
        }
        Err(err) => return Err(err.into()),
    }
    info!(token = %token, number, "answer submitted");

    if session.mark_completed(&missions, number)? {
        write_completed(state, store.as_ref(), &session).await?;
    }

    Ok(MissionDetail {
        number,
        text,
        completed: true,
        answer: Some(AnswerSummary::from(answer)),
    })
}

/// Flip the completion of a public, on-board mission. Stored answers are kept.
pub async fn toggle_completion(
    state: &SharedState,
    token: Option<&str>,
    number: u8,
) -> Result<PlayerView, ServiceError> {
    let token = PlayerToken::parse(token)?;
    let store = state.require_store().await?;
    let missions = load_missions(store.as_ref()).await?;
    let mut session = load_session(store.as_ref(), &token).await?;

    let completed = session.toggle_completed(&missions, number)?;
    write_completed(state, store.as_ref(), &session).await?;
    info!(token = %token, number, completed, "completion toggled");

    Ok(PlayerView::new(&session, &missions))
}

async fn write_completed(
    state: &SharedState,
    store: &dyn BingoStore,
    session: &PlayerSession,
) -> Result<(), ServiceError> {
    let completed = session.completed().iter().copied().collect();
    let matched = store
        .update_player(session.token.to_string(), PlayerUpdate::Completed(completed))
        .await?;
    if !matched {
        return Err(ServiceError::NotFound(format!(
            "player `{}` has no stored board",
            session.token
        )));
    }

    sse_events::publish_player(state, session);
    Ok(())
}

use std::sync::{Arc, Mutex};

use team_bingo_back::{
    config::AppConfig,
    dao::bingo_store::memory::MemoryBingoStore,
    dto::{
        board::{LockBoardRequest, ValidateCellRequest},
        mission::{MissionBoardDto, MissionDto},
        play::SubmitAnswerRequest,
    },
    error::ServiceError,
    services::{admin_service, player_service, ranking_service},
    state::{
        AppState, SharedState,
        feed::{FeedEvent, Topic},
        session::PlayerToken,
    },
};

fn row_major_board() -> Vec<Option<i64>> {
    (1..=25).map(Some).collect()
}

async fn running_game() -> SharedState {
    let state = AppState::new(AppConfig::default());
    state.install_store(Arc::new(MemoryBingoStore::new())).await;

    let missions = (1..=25)
        .map(|number| MissionDto {
            number,
            text: format!("mission {number}"),
            is_public: true,
        })
        .collect();
    admin_service::save_missions(&state, MissionBoardDto { missions })
        .await
        .unwrap();
    state
}

async fn lock(state: &SharedState, token: &str) {
    player_service::lock_board(
        state,
        Some(token),
        LockBoardRequest {
            cells: row_major_board(),
        },
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn locked_board_survives_a_reload() {
    let state = running_game().await;
    lock(&state, "team-a").await;

    let view = player_service::get_view(&state, Some("team-a")).await.unwrap();
    assert!(view.board.locked);
    assert_eq!(view.board.cells, (1..=25).map(Some).collect::<Vec<_>>());
    assert!(view.missions.iter().all(|mission| mission.on_board));

    let again = player_service::lock_board(
        &state,
        Some("team-a"),
        LockBoardRequest {
            cells: row_major_board(),
        },
    )
    .await;
    assert!(matches!(again, Err(ServiceError::InvalidState(_))));
}

#[tokio::test]
async fn duplicate_cell_is_cleared_and_reported() {
    let mut cells: Vec<Option<i64>> = vec![None; 25];
    cells[0] = Some(7);
    cells[1] = Some(7);

    let response = player_service::validate_cell(
        Some("team-a"),
        ValidateCellRequest { cells, index: 1 },
    )
    .unwrap();

    assert!(!response.valid);
    assert_eq!(response.cells[0], Some(7));
    assert_eq!(response.cells[1], None);
    assert!(!response.available_numbers.contains(&7));
    assert_eq!(response.available_numbers.len(), 24);
}

#[tokio::test]
async fn second_answer_to_a_mission_is_rejected() {
    let state = running_game().await;
    lock(&state, "team-a").await;

    let first = player_service::submit_answer(
        &state,
        Some("team-a"),
        3,
        SubmitAnswerRequest {
            text: "done it".into(),
        },
    )
    .await
    .unwrap();
    assert!(first.completed);

    let second = player_service::submit_answer(
        &state,
        Some("team-a"),
        3,
        SubmitAnswerRequest {
            text: "again".into(),
        },
    )
    .await;
    assert!(matches!(second, Err(ServiceError::Conflict(_))));

    let answers = admin_service::list_answers(&state, Some("team-a"))
        .await
        .unwrap();
    assert_eq!(answers.answers.len(), 1);
    assert_eq!(answers.answers[0].text, "done it");
}

#[tokio::test]
async fn ranking_orders_players_by_lines() {
    let state = running_game().await;
    lock(&state, "team-a").await;
    lock(&state, "team-b").await;

    for number in 1..=5 {
        player_service::toggle_completion(&state, Some("team-b"), number)
            .await
            .unwrap();
    }
    player_service::toggle_completion(&state, Some("team-a"), 1)
        .await
        .unwrap();

    let ranking = ranking_service::get_ranking(&state).await.unwrap();
    let order: Vec<_> = ranking
        .entries
        .iter()
        .map(|entry| (entry.rank, entry.token.as_str(), entry.lines))
        .collect();
    assert_eq!(order, vec![(1, "team-b", 1), (2, "team-a", 0)]);

    let board = ranking_service::get_board(&state, "team-b").await.unwrap();
    assert_eq!(board.completed, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn player_writes_are_pushed_to_subscribers() {
    let state = running_game().await;
    let token = PlayerToken::parse(Some("team-a")).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    state.feed().subscribe(Topic::Player(token), move |event| {
        if let FeedEvent::PlayerChanged(session) = event {
            sink.lock().unwrap().push(session.completed().len());
        }
    });

    lock(&state, "team-a").await;
    player_service::toggle_completion(&state, Some("team-a"), 9)
        .await
        .unwrap();
    lock(&state, "team-b").await;

    assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
}

#[tokio::test]
async fn admin_unlock_reopens_the_board() {
    let state = running_game().await;
    lock(&state, "team-a").await;

    let summary = admin_service::set_player_lock(&state, "team-a", false)
        .await
        .unwrap();
    assert!(!summary.locked);

    let view = player_service::get_view(&state, Some("team-a")).await.unwrap();
    assert!(!view.board.locked);

    let missing = admin_service::set_player_lock(&state, "nobody", true).await;
    assert!(matches!(missing, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn degraded_state_rejects_requests() {
    let state = AppState::new(AppConfig::default());
    let result = player_service::get_view(&state, Some("team-a")).await;
    assert!(matches!(result, Err(ServiceError::Degraded)));
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::AnswerEntity,
    dto::{board::BoardSnapshot, format_system_time, validation::validate_answer_text},
    state::{mission::MissionBoard, session::PlayerSession},
};

/// Everything the player page needs: own board plus the revealed missions.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerView {
    /// Own board, completions and line count.
    pub board: BoardSnapshot,
    /// Public missions ordered by number.
    pub missions: Vec<PublicMission>,
}

impl PlayerView {
    /// Combine a session with the current mission document.
    pub fn new(session: &PlayerSession, missions: &MissionBoard) -> Self {
        let board = BoardSnapshot::from(session);
        let missions = missions
            .public()
            .map(|mission| PublicMission {
                number: mission.number,
                text: mission.text.clone(),
                on_board: board.locked && board.cells.contains(&Some(mission.number)),
                completed: session.completed().contains(&mission.number),
            })
            .collect();
        Self { board, missions }
    }
}

/// Revealed mission as listed on the player page.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicMission {
    /// Board number.
    pub number: u8,
    /// Mission text.
    pub text: String,
    /// Whether the player can open it (board locked and number on it).
    pub on_board: bool,
    /// Whether the player completed it.
    pub completed: bool,
}

/// Opened mission with the player's answer, if one was submitted.
#[derive(Debug, Serialize, ToSchema)]
pub struct MissionDetail {
    /// Board number.
    pub number: u8,
    /// Mission text.
    pub text: String,
    /// Whether the player completed it.
    pub completed: bool,
    /// Previously submitted answer; a mission accepts a single answer.
    pub answer: Option<AnswerSummary>,
}

/// Free-text answer to a mission.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitAnswerRequest {
    /// Answer text; must not be blank.
    #[validate(custom(function = "validate_answer_text"))]
    pub text: String,
}

/// Stored answer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnswerSummary {
    /// Answering player.
    pub token: String,
    /// Mission number.
    pub mission_number: u8,
    /// Answer text.
    pub text: String,
    /// Submission time (RFC 3339).
    pub submitted_at: String,
}

impl From<AnswerEntity> for AnswerSummary {
    fn from(answer: AnswerEntity) -> Self {
        Self {
            token: answer.token,
            mission_number: answer.mission_number,
            text: answer.text,
            submitted_at: format_system_time(answer.submitted_at),
        }
    }
}

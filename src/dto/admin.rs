use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    dao::models::PlayerEntity,
    dto::{format_system_time, play::AnswerSummary},
};

/// Player row on the admin page.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerLockSummary {
    /// Player token.
    pub token: String,
    /// Whether the board is locked.
    pub locked: bool,
    /// Completed missions.
    pub completed: usize,
    /// Last write to the player document (RFC 3339).
    pub updated_at: String,
}

impl From<PlayerEntity> for PlayerLockSummary {
    fn from(player: PlayerEntity) -> Self {
        Self {
            token: player.token,
            locked: player.locked,
            completed: player.completed.len(),
            updated_at: format_system_time(player.updated_at),
        }
    }
}

/// Every known player, ordered by token.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayersResponse {
    /// Player rows.
    pub players: Vec<PlayerLockSummary>,
}

/// New value of a player's lock flag.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetLockRequest {
    /// `true` locks the board, `false` unlocks it.
    pub locked: bool,
}

/// Optional filter for the answer list.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnswersQuery {
    /// Only list answers of this player.
    pub token: Option<String>,
}

/// Submitted answers, oldest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswersResponse {
    /// Answers ordered by submission time.
    pub answers: Vec<AnswerSummary>,
}

use serde::{Deserialize, Serialize};
use serde_with::{TimestampMilliSeconds, serde_as};
use std::time::SystemTime;

/// Single mission entry inside the shared mission document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MissionEntity {
    /// Board number the mission is tied to (1..=25).
    pub number: u8,
    /// Mission text shown to players; may be empty.
    pub text: String,
    /// Whether players may open the mission.
    pub is_public: bool,
}

/// The shared mission document (one per deployment).
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MissionBoardEntity {
    /// Missions keyed by their `number` field.
    pub missions: Vec<MissionEntity>,
    /// Last time an admin saved the document.
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub updated_at: SystemTime,
}

/// Per-player document, keyed by the player token.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Free-form token identifying the player.
    pub token: String,
    /// Board numbers in row-major order; `0` marks an empty cell.
    pub board: Vec<u8>,
    /// Whether the board is locked.
    pub locked: bool,
    /// Mission numbers the player completed.
    pub completed: Vec<u8>,
    /// Last time the document was written.
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub updated_at: SystemTime,
}

/// Partial update applied to a player document without rewriting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerUpdate {
    /// Set the lock flag (admin only).
    Locked(bool),
    /// Replace the completed numbers.
    Completed(Vec<u8>),
}

/// Write-once answer to a mission.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerEntity {
    /// Token of the answering player.
    pub token: String,
    /// Mission number answered.
    pub mission_number: u8,
    /// Free-text answer.
    pub text: String,
    /// Submission time, stored as epoch milliseconds.
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub submitted_at: SystemTime,
}

impl AnswerEntity {
    /// Document key of this answer.
    pub fn key(&self) -> String {
        answer_key(&self.token, self.mission_number)
    }
}

/// Document key for the answer of `token` to mission `number`.
pub fn answer_key(token: &str, number: u8) -> String {
    format!("{token}_{number}")
}

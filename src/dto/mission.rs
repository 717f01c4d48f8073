use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::state::mission::{Mission, MissionBoard};

/// Mission as exchanged with the admin page and pushed to players.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct MissionDto {
    /// Board number (1..=25).
    #[validate(range(min = 1, max = 25))]
    pub number: u8,
    /// Mission text; may be empty.
    #[serde(default)]
    pub text: String,
    /// Whether players may open the mission.
    #[serde(default)]
    pub is_public: bool,
}

impl From<&Mission> for MissionDto {
    fn from(mission: &Mission) -> Self {
        Self {
            number: mission.number,
            text: mission.text.clone(),
            is_public: mission.is_public,
        }
    }
}

impl From<MissionDto> for Mission {
    fn from(dto: MissionDto) -> Self {
        Self {
            number: dto.number,
            text: dto.text,
            is_public: dto.is_public,
        }
    }
}

/// Full mission document; numbers left out are saved as blank hidden missions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct MissionBoardDto {
    /// Missions ordered by number.
    #[validate(nested)]
    pub missions: Vec<MissionDto>,
}

impl From<&MissionBoard> for MissionBoardDto {
    fn from(board: &MissionBoard) -> Self {
        Self {
            missions: board.iter().map(MissionDto::from).collect(),
        }
    }
}

impl From<MissionBoardDto> for MissionBoard {
    fn from(dto: MissionBoardDto) -> Self {
        MissionBoard::from_missions(dto.missions.into_iter().map(Mission::from))
    }
}

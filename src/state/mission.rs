use indexmap::IndexMap;

use crate::{
    dao::models::{MissionBoardEntity, MissionEntity},
    state::board::MAX_NUMBER,
};

/// Challenge attached to one board number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mission {
    /// Board number the mission belongs to (1..=25).
    pub number: u8,
    /// Free-form mission text; may be empty.
    pub text: String,
    /// Whether players may open the mission.
    pub is_public: bool,
}

impl Mission {
    /// Blank, hidden mission for `number`.
    pub fn blank(number: u8) -> Self {
        Self {
            number,
            text: String::new(),
            is_public: false,
        }
    }
}

/// The shared number → mission mapping, always holding one entry per board number in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionBoard {
    missions: IndexMap<u8, Mission>,
}

impl MissionBoard {
    /// Board with 25 blank, hidden missions.
    pub fn blank() -> Self {
        Self::from_missions(std::iter::empty())
    }

    /// Build a board from arbitrary mission entries.
    ///
    /// Numbers outside 1..=25 are dropped, later entries win over earlier ones
    /// and missing numbers are filled with blank missions.
    pub fn from_missions(missions: impl IntoIterator<Item = Mission>) -> Self {
        let mut by_number: IndexMap<u8, Mission> = (1..=MAX_NUMBER)
            .map(|number| (number, Mission::blank(number)))
            .collect();

        for mission in missions {
            if let Some(slot) = by_number.get_mut(&mission.number) {
                *slot = mission;
            }
        }

        Self {
            missions: by_number,
        }
    }

    /// Mission for `number`, if the number is on the board.
    pub fn get(&self, number: u8) -> Option<&Mission> {
        self.missions.get(&number)
    }

    /// Every mission ordered by number.
    pub fn iter(&self) -> impl Iterator<Item = &Mission> {
        self.missions.values()
    }

    /// Missions players are allowed to see, ordered by number.
    pub fn public(&self) -> impl Iterator<Item = &Mission> {
        self.iter().filter(|mission| mission.is_public)
    }
}

impl From<MissionEntity> for Mission {
    fn from(entity: MissionEntity) -> Self {
        Self {
            number: entity.number,
            text: entity.text,
            is_public: entity.is_public,
        }
    }
}

impl From<Mission> for MissionEntity {
    fn from(mission: Mission) -> Self {
        Self {
            number: mission.number,
            text: mission.text,
            is_public: mission.is_public,
        }
    }
}

impl From<MissionBoardEntity> for MissionBoard {
    fn from(entity: MissionBoardEntity) -> Self {
        Self::from_missions(entity.missions.into_iter().map(Mission::from))
    }
}

impl From<MissionBoard> for MissionBoardEntity {
    fn from(board: MissionBoard) -> Self {
        Self {
            missions: board.missions.into_values().map(Into::into).collect(),
            updated_at: std::time::SystemTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_board_has_every_number_hidden() {
        let board = MissionBoard::blank();
        let numbers: Vec<u8> = board.iter().map(|m| m.number).collect();
        assert_eq!(numbers, (1..=25).collect::<Vec<_>>());
        assert_eq!(board.public().count(), 0);
    }

    #[test]
    fn from_missions_normalises_entries() {
        let board = MissionBoard::from_missions(vec![
            Mission {
                number: 9,
                text: "first".into(),
                is_public: false,
            },
            Mission {
                number: 30,
                text: "ignored".into(),
                is_public: true,
            },
            Mission {
                number: 9,
                text: "second".into(),
                is_public: true,
            },
            Mission {
                number: 2,
                text: String::new(),
                is_public: true,
            },
        ]);

        assert_eq!(board.iter().count(), 25);
        assert_eq!(board.get(9).map(|m| m.text.as_str()), Some("second"));
        assert!(board.get(30).is_none());
        let public: Vec<u8> = board.public().map(|m| m.number).collect();
        assert_eq!(public, vec![2, 9]);
    }
}

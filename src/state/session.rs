//! Player session lifecycle: `Editing` → `Locked`, mission gating and
//! completion tracking.

use std::{collections::BTreeSet, fmt};

use thiserror::Error;

use crate::{
    dao::models::PlayerEntity,
    state::{
        board::{BoardDraft, BoardError, LockedBoard},
        mission::{Mission, MissionBoard},
    },
};

/// Identifier of a player document, taken verbatim from the `token` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerToken(String);

impl PlayerToken {
    /// Parse an optional raw token, trimming whitespace and rejecting blanks.
    pub fn parse(raw: Option<&str>) -> Result<Self, SessionError> {
        raw.map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| Self(token.to_owned()))
            .ok_or(SessionError::MissingToken)
    }

    /// Borrow the token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised by player session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No player token was supplied.
    #[error("a player token is required")]
    MissingToken,
    /// The board failed validation.
    #[error(transparent)]
    Board(#[from] BoardError),
    /// Board edits or a second lock after the board was locked.
    #[error("board is already locked")]
    AlreadyLocked,
    /// Mission interactions before the board is locked.
    #[error("board must be locked first")]
    NotLocked,
    /// The mission is not public yet.
    #[error("mission {number} is not revealed yet")]
    MissionHidden {
        /// Mission number.
        number: u8,
    },
    /// The number is not one of the player's board numbers.
    #[error("number {number} is not on this board")]
    NotOnBoard {
        /// Mission number.
        number: u8,
    },
    /// An answer already exists for this player and mission.
    #[error("an answer for mission {number} was already submitted")]
    AlreadySubmitted {
        /// Mission number.
        number: u8,
    },
}

/// Where a player is in the board lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Board cells can still change.
    Editing(BoardDraft),
    /// Board is frozen; only completions change.
    Locked(LockedBoard),
}

/// One player's board and completion state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSession {
    /// Owner of the session.
    pub token: PlayerToken,
    /// Board lifecycle phase.
    pub phase: SessionPhase,
    completed: BTreeSet<u8>,
}

impl PlayerSession {
    /// Fresh session with an empty board.
    pub fn new(token: PlayerToken) -> Self {
        Self {
            token,
            phase: SessionPhase::Editing(BoardDraft::new()),
            completed: BTreeSet::new(),
        }
    }

    /// Whether the board has been locked.
    pub fn is_locked(&self) -> bool {
        matches!(self.phase, SessionPhase::Locked(_))
    }

    /// Board cells, empty ones as `None`.
    pub fn cells(&self) -> Vec<Option<u8>> {
        match &self.phase {
            SessionPhase::Editing(draft) => draft.cells().to_vec(),
            SessionPhase::Locked(board) => board.cells().iter().copied().map(Some).collect(),
        }
    }

    /// Completed mission numbers in ascending order.
    pub fn completed(&self) -> &BTreeSet<u8> {
        &self.completed
    }

    /// Number of completed lines; always zero before lock.
    pub fn lines(&self) -> u8 {
        match &self.phase {
            SessionPhase::Editing(_) => 0,
            SessionPhase::Locked(board) => board.count_lines(&self.completed),
        }
    }

    /// Lock the given draft, resetting completions.
    pub fn lock(&mut self, draft: &BoardDraft) -> Result<(), SessionError> {
        if self.is_locked() {
            return Err(SessionError::AlreadyLocked);
        }

        let board = draft.lock()?;
        self.completed.clear();
        self.phase = SessionPhase::Locked(board);
        Ok(())
    }

    /// Resolve a mission the player is allowed to open.
    pub fn open_mission<'a>(
        &self,
        missions: &'a MissionBoard,
        number: u8,
    ) -> Result<&'a Mission, SessionError> {
        let SessionPhase::Locked(board) = &self.phase else {
            return Err(SessionError::NotLocked);
        };
        if !board.contains(number) {
            return Err(SessionError::NotOnBoard { number });
        }

        missions
            .get(number)
            .filter(|mission| mission.is_public)
            .ok_or(SessionError::MissionHidden { number })
    }

    /// Mark `number` as completed; returns `false` when it already was.
    pub fn mark_completed(
        &mut self,
        missions: &MissionBoard,
        number: u8,
    ) -> Result<bool, SessionError> {
        self.open_mission(missions, number)?;
        Ok(self.completed.insert(number))
    }

    /// Flip the completion of `number`; returns the new completion state.
    pub fn toggle_completed(
        &mut self,
        missions: &MissionBoard,
        number: u8,
    ) -> Result<bool, SessionError> {
        self.open_mission(missions, number)?;
        if self.completed.remove(&number) {
            Ok(false)
        } else {
            self.completed.insert(number);
            Ok(true)
        }
    }
}

impl TryFrom<PlayerEntity> for PlayerSession {
    type Error = SessionError;

    fn try_from(entity: PlayerEntity) -> Result<Self, Self::Error> {
        let token = PlayerToken::parse(Some(&entity.token))?;

        if !entity.locked {
            return Ok(Self {
                token,
                phase: SessionPhase::Editing(BoardDraft::from_numbers(&entity.board)),
                completed: BTreeSet::new(),
            });
        }

        let board = LockedBoard::try_from(entity.board.as_slice())?;
        let completed = entity
            .completed
            .into_iter()
            .filter(|number| board.contains(*number))
            .collect();

        Ok(Self {
            token,
            phase: SessionPhase::Locked(board),
            completed,
        })
    }
}

impl From<&PlayerSession> for PlayerEntity {
    fn from(session: &PlayerSession) -> Self {
        // Empty draft cells are stored as 0, which never passes `check_number`.
        let board = session
            .cells()
            .into_iter()
            .map(|cell| cell.unwrap_or(0))
            .collect();
        Self {
            token: session.token.to_string(),
            board,
            locked: session.is_locked(),
            completed: session.completed.iter().copied().collect(),
            updated_at: std::time::SystemTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn token() -> PlayerToken {
        PlayerToken::parse(Some("team-a")).unwrap()
    }

    fn full_draft() -> BoardDraft {
        let raw: Vec<Option<i64>> = (1..=25).rev().map(Some).collect();
        BoardDraft::from_raw(&raw).unwrap()
    }

    fn missions_with_public(numbers: &[u8]) -> MissionBoard {
        MissionBoard::from_missions(numbers.iter().map(|&number| Mission {
            number,
            text: format!("mission {number}"),
            is_public: true,
        }))
    }

    #[test]
    fn token_is_trimmed_and_required() {
        assert_eq!(PlayerToken::parse(Some("  abc ")).unwrap().as_str(), "abc");
        assert_eq!(PlayerToken::parse(Some("   ")), Err(SessionError::MissingToken));
        assert_eq!(PlayerToken::parse(None), Err(SessionError::MissingToken));
    }

    #[test]
    fn lock_transitions_once() {
        let mut session = PlayerSession::new(token());
        assert!(!session.is_locked());

        session.lock(&full_draft()).unwrap();
        assert!(session.is_locked());
        assert_eq!(session.cells()[0], Some(25));
        assert!(session.completed().is_empty());

        assert_eq!(
            session.lock(&full_draft()).unwrap_err(),
            SessionError::AlreadyLocked
        );
    }

    #[test]
    fn lock_with_empty_cell_is_incomplete() {
        let mut raw: Vec<Option<i64>> = (1..=24).map(Some).collect();
        raw.push(None);
        let draft = BoardDraft::from_raw(&raw).unwrap();

        let mut session = PlayerSession::new(token());
        let err = session.lock(&draft).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Board(BoardError::IncompleteBoard { .. })
        ));
        assert!(!session.is_locked());
    }

    #[test]
    fn missions_require_lock_and_visibility() {
        let missions = missions_with_public(&[3]);
        let mut session = PlayerSession::new(token());

        assert_eq!(
            session.open_mission(&missions, 3).unwrap_err(),
            SessionError::NotLocked
        );

        session.lock(&full_draft()).unwrap();
        assert_eq!(session.open_mission(&missions, 3).unwrap().number, 3);
        assert_eq!(
            session.open_mission(&missions, 4).unwrap_err(),
            SessionError::MissionHidden { number: 4 }
        );
        assert_eq!(
            session.open_mission(&missions, 26).unwrap_err(),
            SessionError::NotOnBoard { number: 26 }
        );
    }

    #[test]
    fn completions_feed_line_count() {
        let missions = missions_with_public(&[25, 24, 23, 22, 21, 8]);
        let mut session = PlayerSession::new(token());
        session.lock(&full_draft()).unwrap();

        for number in [25, 24, 23, 22] {
            assert!(session.mark_completed(&missions, number).unwrap());
        }
        assert_eq!(session.lines(), 0);
        assert!(session.mark_completed(&missions, 21).unwrap());
        assert!(!session.mark_completed(&missions, 21).unwrap());
        assert_eq!(session.lines(), 1);

        assert!(!session.toggle_completed(&missions, 21).unwrap());
        assert_eq!(session.lines(), 0);
        assert!(session.toggle_completed(&missions, 21).unwrap());
        assert_eq!(session.lines(), 1);
    }

    #[test]
    fn entity_round_trip_keeps_board() {
        let missions = missions_with_public(&[5]);
        let mut session = PlayerSession::new(token());
        session.lock(&full_draft()).unwrap();
        session.mark_completed(&missions, 5).unwrap();

        let entity = PlayerEntity::from(&session);
        assert!(entity.locked);
        assert_eq!(entity.board, (1..=25).rev().collect::<Vec<u8>>());
        assert_eq!(entity.completed, vec![5]);

        let restored = PlayerSession::try_from(entity).unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn stray_completions_are_dropped_on_load() {
        let entity = PlayerEntity {
            token: "team-b".into(),
            board: (1..=25).collect(),
            locked: true,
            completed: vec![1, 2, 77],
            updated_at: SystemTime::now(),
        };
        let session = PlayerSession::try_from(entity).unwrap();
        assert_eq!(
            session.completed().iter().copied().collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn unlocked_entity_restores_draft() {
        let entity = PlayerEntity {
            token: "team-c".into(),
            board: vec![4, 5, 6],
            locked: false,
            completed: vec![4],
            updated_at: SystemTime::now(),
        };
        let session = PlayerSession::try_from(entity).unwrap();
        assert!(!session.is_locked());
        assert_eq!(&session.cells()[..4], &[Some(4), Some(5), Some(6), None]);
        assert!(session.completed().is_empty());
    }
}

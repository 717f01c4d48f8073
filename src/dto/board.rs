use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::state::{board::BOARD_CELLS, session::PlayerSession};

/// `?token=` query parameter identifying the player.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TokenQuery {
    /// Free-form player token.
    pub token: Option<String>,
}

/// Current board cells plus the index of the cell that just lost focus.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ValidateCellRequest {
    /// 25 cells in row-major order; `null` marks an empty cell.
    #[validate(length(equal = 25))]
    pub cells: Vec<Option<i64>>,
    /// Index (0..25) of the cell to check.
    #[validate(range(max = 24))]
    pub index: usize,
}

/// Outcome of a blur-time cell check.
#[derive(Debug, Serialize, ToSchema)]
pub struct CellValidationResponse {
    /// Whether the cell may keep its value.
    pub valid: bool,
    /// Cells after the check; a duplicate cell comes back empty.
    pub cells: Vec<Option<u8>>,
    /// Human-readable reason when `valid` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Numbers not used by any other cell, filled when a duplicate was found.
    pub available_numbers: Vec<u8>,
}

/// Board submitted for locking.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LockBoardRequest {
    /// 25 cells in row-major order; every cell must be filled.
    #[validate(length(equal = 25))]
    pub cells: Vec<Option<i64>>,
}

/// One player's board as shown on the player page and the read-only ranking view.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BoardSnapshot {
    /// Player token.
    pub token: String,
    /// Whether the board is locked.
    pub locked: bool,
    /// 25 cells in row-major order; `null` marks an empty cell.
    pub cells: Vec<Option<u8>>,
    /// Completed mission numbers, ascending.
    pub completed: Vec<u8>,
    /// Completed rows, columns and diagonals.
    pub lines: u8,
    /// Number of cells on the board.
    pub total_cells: usize,
}

impl From<&PlayerSession> for BoardSnapshot {
    fn from(session: &PlayerSession) -> Self {
        Self {
            token: session.token.to_string(),
            locked: session.is_locked(),
            cells: session.cells(),
            completed: session.completed().iter().copied().collect(),
            lines: session.lines(),
            total_cells: BOARD_CELLS,
        }
    }
}

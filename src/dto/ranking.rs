use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::RankingMetric,
    state::{board::BOARD_CELLS, session::PlayerSession},
};

/// Ranking sort key as exposed to clients.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RankingMetricDto {
    /// Completed lines.
    Lines,
    /// Completed missions.
    Completed,
}

impl From<RankingMetric> for RankingMetricDto {
    fn from(metric: RankingMetric) -> Self {
        match metric {
            RankingMetric::Lines => Self::Lines,
            RankingMetric::Completed => Self::Completed,
        }
    }
}

/// One ranking row.
#[derive(Debug, Serialize, ToSchema)]
pub struct RankingEntry {
    /// 1-based position; tied players share a rank.
    pub rank: usize,
    /// Player token.
    pub token: String,
    /// Completed missions.
    pub completed: usize,
    /// Completed lines.
    pub lines: u8,
    /// Number of cells on the board.
    pub total_cells: usize,
    /// Whether the board is locked.
    pub locked: bool,
}

impl RankingEntry {
    /// Row for `session` at position `rank`; `completed` is the stored completion count.
    pub fn new(rank: usize, session: &PlayerSession, completed: usize) -> Self {
        Self {
            rank,
            token: session.token.to_string(),
            completed,
            lines: session.lines(),
            total_cells: BOARD_CELLS,
            locked: session.is_locked(),
        }
    }
}

/// Leaderboard, best first.
#[derive(Debug, Serialize, ToSchema)]
pub struct RankingResponse {
    /// Metric the rows are sorted by.
    pub metric: RankingMetricDto,
    /// Rows sorted by metric descending, then token ascending.
    pub entries: Vec<RankingEntry>,
}

use std::cmp::Reverse;

use tracing::warn;

use crate::{
    config::RankingMetric,
    dto::{
        board::BoardSnapshot,
        ranking::{RankingEntry, RankingResponse},
    },
    dao::models::PlayerEntity,
    error::ServiceError,
    services::player_service,
    state::{
        SharedState,
        session::{PlayerSession, PlayerToken},
    },
};

/// One-shot leaderboard over every stored player.
pub async fn get_ranking(state: &SharedState) -> Result<RankingResponse, ServiceError> {
    let store = state.require_store().await?;
    let metric = state.config().ranking_metric();

    let players = store
        .list_players()
        .await?
        .into_iter()
        .filter_map(|entity| match Ranked::try_from(entity) {
            Ok(player) => Some(player),
            Err(err) => {
                warn!(error = %err, "skipping player in ranking");
                None
            }
        })
        .collect();

    Ok(RankingResponse {
        metric: metric.into(),
        entries: rank(players, metric),
    })
}

/// Read-only board of one player, as opened from a ranking row.
pub async fn get_board(state: &SharedState, token: &str) -> Result<BoardSnapshot, ServiceError> {
    let token = PlayerToken::parse(Some(token))?;
    let store = state.require_store().await?;

    player_service::find_session(store.as_ref(), &token)
        .await?
        .map(|session| BoardSnapshot::from(&session))
        .ok_or_else(|| ServiceError::NotFound(format!("player `{token}`")))
}

/// A ranked player: the session counts lines, the stored list counts completions.
///
/// Completions are taken as stored, so an unlocked board keeps its count.
struct Ranked {
    session: PlayerSession,
    completed: usize,
}

impl TryFrom<PlayerEntity> for Ranked {
    type Error = ServiceError;

    fn try_from(entity: PlayerEntity) -> Result<Self, Self::Error> {
        let completed = entity.completed.len();
        let session = player_service::session_from_entity(entity)?;
        Ok(Self { session, completed })
    }
}

impl Ranked {
    fn score(&self, metric: RankingMetric) -> usize {
        match metric {
            RankingMetric::Lines => usize::from(self.session.lines()),
            RankingMetric::Completed => self.completed,
        }
    }
}

/// Sort descending by `metric`, ties by token ascending; tied scores share a rank.
fn rank(mut players: Vec<Ranked>, metric: RankingMetric) -> Vec<RankingEntry> {
    players.sort_by_cached_key(|player| {
        (Reverse(player.score(metric)), player.session.token.clone())
    });

    let mut entries: Vec<RankingEntry> = Vec::with_capacity(players.len());
    let mut previous: Option<(usize, usize)> = None;
    for (position, player) in players.iter().enumerate() {
        let value = player.score(metric);
        let rank = match previous {
            Some((score, rank)) if score == value => rank,
            _ => position + 1,
        };
        previous = Some((value, rank));
        entries.push(RankingEntry::new(rank, &player.session, player.completed));
    }
    entries
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::SystemTime};

    use super::*;
    use crate::{
        config::{AppConfig, StoreBackend},
        dao::bingo_store::{BingoStore, memory::MemoryBingoStore},
        services::admin_service,
        state::AppState,
    };

    fn entity(token: &str, completed: &[u8]) -> PlayerEntity {
        PlayerEntity {
            token: token.into(),
            board: (1..=25).collect(),
            locked: true,
            completed: completed.to_vec(),
            updated_at: SystemTime::now(),
        }
    }

    fn ranked(token: &str, completed: &[u8]) -> Ranked {
        Ranked::try_from(entity(token, completed)).unwrap()
    }

    fn tokens(entries: &[RankingEntry]) -> Vec<(&str, usize)> {
        entries
            .iter()
            .map(|entry| (entry.token.as_str(), entry.rank))
            .collect()
    }

    #[test]
    fn lines_metric_orders_by_lines_then_token() {
        let players = vec![
            ranked("zeta", &[1, 2, 3, 4, 5]),
            ranked("alpha", &[1, 2, 3, 4, 5, 6, 11, 16, 21]),
            ranked("beta", &[1, 2, 3, 4, 5]),
            ranked("gamma", &[7, 8, 9, 10, 12, 13]),
        ];

        let entries = rank(players, RankingMetric::Lines);
        assert_eq!(
            tokens(&entries),
            vec![("alpha", 1), ("beta", 2), ("zeta", 2), ("gamma", 4)]
        );
        assert_eq!(entries[0].lines, 2);
        assert_eq!(entries[3].completed, 6);
    }

    #[test]
    fn completed_metric_ignores_lines() {
        let players = vec![
            ranked("a", &[1, 2, 3, 4, 5]),
            ranked("b", &[7, 8, 9, 10, 12, 13]),
        ];

        let entries = rank(players, RankingMetric::Completed);
        assert_eq!(tokens(&entries), vec![("b", 1), ("a", 2)]);
    }

    #[tokio::test]
    async fn unlocked_player_keeps_stored_completions() {
        let config = AppConfig::new(RankingMetric::Completed, StoreBackend::Memory);
        let state = AppState::new(config);
        let memory = MemoryBingoStore::new();
        state.install_store(Arc::new(memory.clone())).await;

        memory.save_player(entity("team-a", &[1, 2, 3])).await.unwrap();
        memory.save_player(entity("team-b", &[4])).await.unwrap();
        admin_service::set_player_lock(&state, "team-a", false)
            .await
            .unwrap();

        let ranking = get_ranking(&state).await.unwrap();
        let rows: Vec<_> = ranking
            .entries
            .iter()
            .map(|entry| (entry.token.as_str(), entry.completed, entry.locked))
            .collect();
        assert_eq!(rows, vec![("team-a", 3, false), ("team-b", 1, true)]);
    }
}

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Team Bingo Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::ranking::ranking,
        crate::routes::ranking::player_board,
        crate::routes::play::view,
        crate::routes::play::validate_cell,
        crate::routes::play::lock_board,
        crate::routes::play::open_mission,
        crate::routes::play::submit_answer,
        crate::routes::play::toggle_completion,
        crate::routes::admin::get_missions,
        crate::routes::admin::save_missions,
        crate::routes::admin::list_players,
        crate::routes::admin::set_player_lock,
        crate::routes::admin::list_answers,
        crate::routes::sse::play_stream,
        crate::routes::sse::public_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::ranking::RankingMetricDto,
            crate::dto::ranking::RankingEntry,
            crate::dto::ranking::RankingResponse,
            crate::dto::board::BoardSnapshot,
            crate::dto::board::ValidateCellRequest,
            crate::dto::board::CellValidationResponse,
            crate::dto::board::LockBoardRequest,
            crate::dto::play::PlayerView,
            crate::dto::play::PublicMission,
            crate::dto::play::MissionDetail,
            crate::dto::play::SubmitAnswerRequest,
            crate::dto::play::AnswerSummary,
            crate::dto::mission::MissionDto,
            crate::dto::mission::MissionBoardDto,
            crate::dto::admin::PlayerLockSummary,
            crate::dto::admin::PlayersResponse,
            crate::dto::admin::SetLockRequest,
            crate::dto::admin::AnswersResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "ranking", description = "Leaderboard and read-only boards"),
        (name = "play", description = "Player page: board, missions and answers"),
        (name = "admin", description = "Mission editing, lock flags and answer review"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/healthcheck",
            "/ranking",
            "/ranking/{token}",
            "/play",
            "/play/board/validate",
            "/play/board/lock",
            "/play/missions/{number}",
            "/play/missions/{number}/answer",
            "/play/missions/{number}/toggle",
            "/admin/missions",
            "/admin/players",
            "/admin/players/{token}/lock",
            "/admin/answers",
            "/sse/play",
            "/sse/public",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}

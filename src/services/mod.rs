/// Admin operations: mission document, lock flags, answer review.
pub mod admin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Player page operations: board editing, missions and answers.
pub mod player_service;
/// Leaderboard computation.
pub mod ranking_service;
/// Server-Sent Events payload generation and change publication.
pub mod sse_events;
/// Server-Sent Events subscriptions.
pub mod sse_service;
/// Storage connection supervisor driving degraded mode.
pub mod storage_supervisor;

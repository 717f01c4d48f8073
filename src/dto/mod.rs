use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Admin page bodies.
pub mod admin;
/// Board editing and snapshot bodies.
pub mod board;
/// Health check body.
pub mod health;
/// Mission document bodies.
pub mod mission;
/// Player page bodies.
pub mod play;
/// Leaderboard bodies.
pub mod ranking;
/// Server-Sent Events payloads.
pub mod sse;
/// Custom field validators.
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

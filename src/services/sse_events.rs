use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        board::BoardSnapshot,
        mission::{MissionBoardDto, MissionDto},
        sse::{Handshake, ServerEvent, SystemStatus},
    },
    state::{SharedState, feed::FeedEvent, mission::MissionBoard, session::PlayerSession},
};

const EVENT_HANDSHAKE: &str = "handshake";
const EVENT_MISSIONS: &str = "missions.updated";
const EVENT_PLAYER: &str = "player.updated";
const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Publish a rewritten mission document on the change feed.
pub fn publish_missions(state: &SharedState, missions: &MissionBoard) -> usize {
    state
        .feed()
        .publish(&FeedEvent::MissionsChanged(missions.clone()))
}

/// Publish a created or updated player document on the change feed.
pub fn publish_player(state: &SharedState, session: &PlayerSession) -> usize {
    state
        .feed()
        .publish(&FeedEvent::PlayerChanged(session.clone()))
}

/// Render a feed event for SSE clients.
///
/// Mission payloads only carry public missions so hidden texts never leave the server.
pub fn server_event(event: &FeedEvent) -> Option<ServerEvent> {
    match event {
        FeedEvent::MissionsChanged(missions) => missions_event(missions),
        FeedEvent::PlayerChanged(session) => player_event(session),
        FeedEvent::StatusChanged { degraded } => encode(
            EVENT_SYSTEM_STATUS,
            &SystemStatus {
                degraded: *degraded,
            },
        ),
    }
}

/// Snapshot of the public missions.
pub fn missions_event(missions: &MissionBoard) -> Option<ServerEvent> {
    let payload = MissionBoardDto {
        missions: missions.public().map(MissionDto::from).collect(),
    };
    encode(EVENT_MISSIONS, &payload)
}

/// Snapshot of one player board.
pub fn player_event(session: &PlayerSession) -> Option<ServerEvent> {
    encode(EVENT_PLAYER, &BoardSnapshot::from(session))
}

/// First event of every stream.
pub fn handshake_event(stream: &str, degraded: bool) -> Option<ServerEvent> {
    encode(
        EVENT_HANDSHAKE,
        &Handshake {
            stream: stream.to_owned(),
            message: format!("{stream} stream connected"),
            degraded,
        },
    )
}

fn encode(event: &str, payload: &impl Serialize) -> Option<ServerEvent> {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(event, error = %err, "failed to serialize SSE payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{mission::Mission, session::PlayerToken};

    #[test]
    fn mission_events_hide_private_missions() {
        let missions = MissionBoard::from_missions([
            Mission {
                number: 2,
                text: "public".into(),
                is_public: true,
            },
            Mission {
                number: 3,
                text: "secret".into(),
                is_public: false,
            },
        ]);

        let event = server_event(&FeedEvent::MissionsChanged(missions)).unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_MISSIONS));
        assert!(event.data.contains("public"));
        assert!(!event.data.contains("secret"));
    }

    #[test]
    fn player_and_status_events_are_named() {
        let session = PlayerSession::new(PlayerToken::parse(Some("team-a")).unwrap());
        let event = server_event(&FeedEvent::PlayerChanged(session)).unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_PLAYER));
        assert!(event.data.contains("\"token\":\"team-a\""));

        let event = server_event(&FeedEvent::StatusChanged { degraded: true }).unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_SYSTEM_STATUS));
        assert_eq!(event.data, r#"{"degraded":true}"#);
    }
}

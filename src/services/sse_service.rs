use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, KeepAliveStream, Sse};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::{
    dto::sse::ServerEvent,
    error::ServiceError,
    services::{player_service, sse_events},
    state::{
        SharedState,
        feed::{FeedEvent, SubscriptionId, Topic},
        session::PlayerToken,
    },
};

const CHANNEL_CAPACITY: usize = 32;

/// Response type shared by every SSE endpoint.
pub type EventStream = Sse<KeepAliveStream<ReceiverStream<Result<Event, Infallible>>>>;

/// Which change-feed topics a stream follows.
#[derive(Clone, Debug)]
pub enum StreamKind {
    /// Every change (ranking and admin pages).
    Public,
    /// Mission document plus one player's own record.
    Play(PlayerToken),
}

impl StreamKind {
    fn name(&self) -> &'static str {
        match self {
            StreamKind::Public => "public",
            StreamKind::Play(_) => "play",
        }
    }

    fn topics(&self) -> Vec<Topic> {
        match self {
            StreamKind::Public => vec![Topic::Everything],
            StreamKind::Play(token) => vec![Topic::Missions, Topic::Player(token.clone())],
        }
    }
}

/// Subscribe to the mission document and the caller's own player record.
pub async fn subscribe_play(
    state: &SharedState,
    token: Option<&str>,
) -> Result<EventStream, ServiceError> {
    let token = PlayerToken::parse(token)?;
    Ok(open_stream(state, StreamKind::Play(token)))
}

/// Subscribe to every change.
pub async fn subscribe_public(state: &SharedState) -> EventStream {
    open_stream(state, StreamKind::Public)
}

/// Attach to the change feed, then send the handshake, the current snapshot and
/// every later change until the client disconnects.
///
/// Feed events published while the snapshot loads are buffered and follow it;
/// since each event carries a full document, a repeat is harmless.
fn open_stream(state: &SharedState, kind: StreamKind) -> EventStream {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(CHANNEL_CAPACITY);
    let (live_tx, live_rx) = mpsc::unbounded_channel::<ServerEvent>();

    let ids: Vec<SubscriptionId> = kind
        .topics()
        .into_iter()
        .map(|topic| {
            let live_tx = live_tx.clone();
            state.feed().subscribe(topic, move |event: &FeedEvent| {
                if let Some(payload) = sse_events::server_event(event)
                    && live_tx.send(payload).is_err()
                {
                    debug!("SSE forwarder already gone; dropping feed event");
                }
            })
        })
        .collect();
    info!(stream = kind.name(), "SSE stream connected");

    tokio::spawn(forward(state.clone(), kind, ids, live_rx, tx));

    Sse::new(ReceiverStream::new(rx)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Forwarder task: snapshot first, then buffered and live feed events, with
/// backpressure from the response channel.
async fn forward(
    state: SharedState,
    kind: StreamKind,
    ids: Vec<SubscriptionId>,
    mut live: mpsc::UnboundedReceiver<ServerEvent>,
    tx: mpsc::Sender<Result<Event, Infallible>>,
) {
    let mut connected = true;
    for payload in snapshot(&state, &kind).await {
        if tx.send(Ok(to_event(payload))).await.is_err() {
            connected = false;
            break;
        }
    }

    while connected {
        tokio::select! {
            _ = tx.closed() => break,
            next = live.recv() => match next {
                Some(payload) => {
                    if tx.send(Ok(to_event(payload))).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    for id in ids {
        state.feed().unsubscribe(id);
    }
    info!(stream = kind.name(), "SSE stream disconnected");
}

/// Handshake followed by the current state, like a snapshot listener firing on attach.
async fn snapshot(state: &SharedState, kind: &StreamKind) -> Vec<ServerEvent> {
    let mut events: Vec<ServerEvent> = sse_events::handshake_event(kind.name(), state.is_degraded())
        .into_iter()
        .collect();

    let Ok(store) = state.require_store().await else {
        return events;
    };

    let loaded = async {
        let missions = player_service::load_missions(store.as_ref()).await?;
        events.extend(sse_events::missions_event(&missions));

        match kind {
            StreamKind::Play(token) => {
                let session = player_service::load_session(store.as_ref(), token).await?;
                events.extend(sse_events::player_event(&session));
            }
            StreamKind::Public => {
                for entity in store.list_players().await? {
                    if let Ok(session) = player_service::session_from_entity(entity) {
                        events.extend(sse_events::player_event(&session));
                    }
                }
            }
        }
        Ok::<_, ServiceError>(())
    };

    if let Err(err) = loaded.await {
        warn!(stream = kind.name(), error = %err, "failed to load SSE snapshot");
    }
    events
}

fn to_event(payload: ServerEvent) -> Event {
    let event = match payload.event {
        Some(name) => Event::default().event(name),
        None => Event::default(),
    };
    event.data(payload.data)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::bingo_store::memory::MemoryBingoStore,
        state::{AppState, mission::MissionBoard},
    };

    #[tokio::test]
    async fn streams_unsubscribe_when_dropped() {
        let state = AppState::new(AppConfig::default());
        state.install_store(Arc::new(MemoryBingoStore::new())).await;

        let stream = subscribe_play(&state, Some("team-a")).await.unwrap();
        assert_eq!(state.feed().subscriber_count(), 2);
        assert_eq!(
            sse_events::publish_missions(&state, &MissionBoard::blank()),
            1
        );

        drop(stream);
        for _ in 0..100 {
            if state.feed().subscriber_count() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(state.feed().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn play_stream_requires_token() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            subscribe_play(&state, None).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }
}

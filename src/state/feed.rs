//! In-process change feed: the push side of the document store.
//!
//! Services publish after every successful write; subscribers (SSE streams,
//! tests) register a callback for a [`Topic`] and receive matching events
//! synchronously on the publishing task.

use std::{fmt, sync::Arc};

use dashmap::DashMap;
use uuid::Uuid;

use crate::state::{
    mission::MissionBoard,
    session::{PlayerSession, PlayerToken},
};

/// What a subscriber wants to hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    /// The shared mission document.
    Missions,
    /// One player document.
    Player(PlayerToken),
    /// Every change.
    Everything,
}

/// Change notification delivered to subscribers.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// The mission document was rewritten.
    MissionsChanged(MissionBoard),
    /// A player document was created or updated.
    PlayerChanged(PlayerSession),
    /// Storage connectivity changed; delivered to every subscriber.
    StatusChanged {
        /// Whether the service now runs without storage.
        degraded: bool,
    },
}

impl FeedEvent {
    fn reaches(&self, topic: &Topic) -> bool {
        match (self, topic) {
            (FeedEvent::StatusChanged { .. }, _) | (_, Topic::Everything) => true,
            (FeedEvent::MissionsChanged(_), Topic::Missions) => true,
            (FeedEvent::PlayerChanged(session), Topic::Player(token)) => session.token == *token,
            _ => false,
        }
    }
}

/// Handle returned by [`ChangeFeed::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

type Callback = Arc<dyn Fn(&FeedEvent) + Send + Sync>;

struct Subscriber {
    topic: Topic,
    callback: Callback,
}

/// Registry of change subscribers.
#[derive(Default)]
pub struct ChangeFeed {
    subscribers: DashMap<SubscriptionId, Subscriber>,
}

impl ChangeFeed {
    /// Empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for events matching `topic`.
    pub fn subscribe<F>(&self, topic: Topic, callback: F) -> SubscriptionId
    where
        F: Fn(&FeedEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.insert(
            id,
            Subscriber {
                topic,
                callback: Arc::new(callback),
            },
        );
        id
    }

    /// Remove a subscription; returns `false` when it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Deliver `event` to every matching subscriber, returning how many were reached.
    ///
    /// Callbacks run after the registry locks are released, so a callback may
    /// subscribe or unsubscribe without deadlocking.
    pub fn publish(&self, event: &FeedEvent) -> usize {
        let targets: Vec<Callback> = self
            .subscribers
            .iter()
            .filter(|entry| event.reaches(&entry.topic))
            .map(|entry| entry.callback.clone())
            .collect();

        for callback in &targets {
            callback(event);
        }
        targets.len()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&FeedEvent) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback = move |event: &FeedEvent| {
            let label = match event {
                FeedEvent::MissionsChanged(_) => "missions".to_string(),
                FeedEvent::PlayerChanged(session) => format!("player:{}", session.token),
                FeedEvent::StatusChanged { degraded } => format!("status:{degraded}"),
            };
            sink.lock().unwrap().push(label);
        };
        (seen, callback)
    }

    fn player(token: &str) -> FeedEvent {
        FeedEvent::PlayerChanged(PlayerSession::new(
            PlayerToken::parse(Some(token)).unwrap(),
        ))
    }

    #[test]
    fn events_reach_matching_topics_only() {
        let feed = ChangeFeed::new();
        let (missions_seen, on_missions) = recorder();
        let (player_seen, on_player) = recorder();
        let (all_seen, on_all) = recorder();

        feed.subscribe(Topic::Missions, on_missions);
        feed.subscribe(
            Topic::Player(PlayerToken::parse(Some("a")).unwrap()),
            on_player,
        );
        feed.subscribe(Topic::Everything, on_all);

        assert_eq!(feed.publish(&FeedEvent::MissionsChanged(MissionBoard::blank())), 2);
        assert_eq!(feed.publish(&player("a")), 2);
        assert_eq!(feed.publish(&player("b")), 1);
        assert_eq!(feed.publish(&FeedEvent::StatusChanged { degraded: true }), 3);

        assert_eq!(
            *missions_seen.lock().unwrap(),
            vec!["missions", "status:true"]
        );
        assert_eq!(*player_seen.lock().unwrap(), vec!["player:a", "status:true"]);
        assert_eq!(
            *all_seen.lock().unwrap(),
            vec!["missions", "player:a", "player:b", "status:true"]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let feed = ChangeFeed::new();
        let (seen, callback) = recorder();
        let id = feed.subscribe(Topic::Missions, callback);

        feed.publish(&FeedEvent::MissionsChanged(MissionBoard::blank()));
        assert!(feed.unsubscribe(id));
        assert!(!feed.unsubscribe(id));
        feed.publish(&FeedEvent::MissionsChanged(MissionBoard::blank()));

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let feed = Arc::new(ChangeFeed::new());
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let feed_in_callback = feed.clone();
        let slot_in_callback = slot.clone();
        let id = feed.subscribe(Topic::Everything, move |_| {
            if let Some(id) = slot_in_callback.lock().unwrap().take() {
                feed_in_callback.unsubscribe(id);
            }
        });
        *slot.lock().unwrap() = Some(id);

        assert_eq!(feed.publish(&FeedEvent::StatusChanged { degraded: false }), 1);
        assert_eq!(feed.subscriber_count(), 0);
    }
}

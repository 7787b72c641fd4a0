//! Deck event bus for the presentation layer
//!
//! The orchestrator publishes discrete deck events; renderers subscribe and
//! own all continuous animation themselves.
//!
//! # Architecture
//!
//! ```text
//! DeckEvent (what happened)
//!      ↓
//! SwipeEvent envelope (id, session, timestamp)
//!      ↓
//! EventBus.publish() → broadcast::Sender
//!      ↓
//! Fan-out to every subscribed renderer
//! ```

pub mod topics;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swipe_types::{Candidate, CandidateId, MatchInfo};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Something the presentation layer should react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeckEvent {
    /// The cards at and after the cursor changed.
    DeckChanged {
        /// Top of the deck, current card first.
        visible: Vec<Candidate>,
    },
    /// A decision produced a mutual match.
    Match(MatchInfo),
    /// A decision failed; the card is back on top.
    DecisionError {
        /// Candidate whose decision failed.
        candidate_id: CandidateId,
        /// Rendered failure reason.
        reason: String,
    },
    /// The last pass was undone on the backend. A following `DeckChanged`
    /// shows it back on top unless the deck was reset meanwhile.
    RewindApplied {
        /// Candidate whose pass was deleted.
        candidate_id: CandidateId,
    },
    /// Restoring the last pass failed; the deck is untouched and the rewind may be retried.
    RewindError {
        /// Candidate that could not be restored.
        candidate_id: CandidateId,
        /// Rendered failure reason.
        reason: String,
    },
    /// Open the profile of the current card.
    DetailsRequested {
        /// Current card.
        candidate: Candidate,
    },
    /// Fetching more candidates failed.
    FetchFailed {
        /// Rendered failure reason.
        reason: String,
    },
    /// No cards left and the backend has nothing more.
    Exhausted,
}

impl DeckEvent {
    /// Routing topic for this event.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::DeckChanged { .. } => topics::DECK_CHANGED,
            Self::Match(_) => topics::DECK_MATCH,
            Self::DecisionError { .. } => topics::DECISION_ERROR,
            Self::RewindApplied { .. } => topics::REWIND_APPLIED,
            Self::RewindError { .. } => topics::REWIND_ERROR,
            Self::DetailsRequested { .. } => topics::DETAILS_REQUESTED,
            Self::FetchFailed { .. } => topics::FETCH_FAILED,
            Self::Exhausted => topics::DECK_EXHAUSTED,
        }
    }
}

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeEvent {
    /// Unique event identifier
    pub id: String,
    /// Deck session that produced the event
    pub session_id: String,
    /// Event payload
    pub event: DeckEvent,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
}

impl SwipeEvent {
    /// Wrap an event for a session.
    pub fn new(session_id: impl Into<String>, event: DeckEvent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            event,
            timestamp: Utc::now(),
        }
    }

    /// Routing topic of the wrapped event.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        self.event.topic()
    }
}

impl std::fmt::Display for SwipeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} -> {}",
            self.timestamp.format("%H:%M:%S"),
            self.session_id,
            self.topic()
        )
    }
}

/// Async fan-out bus for deck events.
///
/// Uses `tokio::sync::broadcast` so publishing never blocks the orchestrator;
/// a slow renderer lags and skips rather than stalling decisions.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SwipeEvent>,
    session_id: String,
    capacity: usize,
}

impl EventBus {
    /// Create a bus for one deck session.
    #[must_use]
    pub fn new(session_id: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            session_id: session_id.into(),
            capacity,
        }
    }

    /// Get the bus capacity
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Session id stamped on every envelope.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Publish an event to all subscribers
    ///
    /// Returns the number of subscribers who received the event.
    /// Returns 0 if there are no subscribers (not an error).
    pub fn publish(&self, event: DeckEvent) -> usize {
        self.tx
            .send(SwipeEvent::new(self.session_id.clone(), event))
            .unwrap_or(0)
    }

    /// Subscribe to the event bus
    ///
    /// Returns a receiver that will receive all future events.
    /// Dropping the receiver automatically unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SwipeEvent> {
        self.tx.subscribe()
    }

    /// Get current subscriber count
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swipe_types::Candidate;

    #[test]
    fn test_event_envelope() {
        let event = SwipeEvent::new("s1", DeckEvent::Exhausted);
        assert_eq!(event.session_id, "s1");
        assert_eq!(event.topic(), topics::DECK_EXHAUSTED);
        assert!(!event.id.is_empty());
        assert!(event.timestamp <= Utc::now());
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = DeckEvent::DecisionError {
            candidate_id: "c-1".into(),
            reason: "offline".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "decision_error");
        assert_eq!(json["candidate_id"], "c-1");
    }

    #[tokio::test]
    async fn test_event_bus_publish() {
        let bus = EventBus::new("s1", 10);
        let mut rx = bus.subscribe();

        let delivered = bus.publish(DeckEvent::DeckChanged {
            visible: vec![Candidate::new("a", "Ada")],
        });
        assert_eq!(delivered, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.session_id, "s1");
        assert_eq!(received.topic(), topics::DECK_CHANGED);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new("s1", 10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(DeckEvent::FetchFailed {
            reason: "boom".to_string(),
        });

        let received1 = rx1.recv().await.unwrap();
        let received2 = rx2.recv().await.unwrap();

        assert_eq!(received1.event, received2.event);
        assert_eq!(received1.id, received2.id);
    }

    #[test]
    fn test_publish_without_subscribers_is_not_an_error() {
        let bus = EventBus::new("s1", 0);
        assert_eq!(bus.capacity(), 1);
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.publish(DeckEvent::Exhausted), 0);
    }
}

//! Swipe orchestrator: turns classified gestures into optimistic decisions,
//! reconciles them with the backend, and owns the rewind step.
//!
//! All deck and rewind-slot mutations happen under one lock that is never held
//! across a backend call. Backend calls run on spawned tasks so they finish
//! even if the caller walks away.

mod commit;
mod fetch;
mod metrics;
mod rewind;
mod types;

use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use swipe_events::{DeckEvent, EventBus, SwipeEvent};
use swipe_types::{Candidate, CandidateId, Decision, DecisionKind};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::client::DecisionClient;
use crate::deck::DeckStore;
use crate::gesture::{DragDelta, GestureOutcome, ReleaseVelocity, classify};
use crate::observability::DeckLogEvent;

use metrics::SwipeMetrics;
pub use metrics::SwipeMetricsSnapshot;
pub use types::{
    CommittedDecision, DeckSnapshot, GestureResponse, IgnoreReason, InteractionPhase,
    OrchestratorConfig, PendingDecision, PendingRewind, RewindResponse,
};

#[derive(Debug, Clone)]
enum Interaction {
    Idle,
    Committing { decision: Decision },
    Rewinding,
}

impl Interaction {
    fn phase(&self) -> InteractionPhase {
        match self {
            Self::Idle => InteractionPhase::Idle,
            Self::Committing { .. } => InteractionPhase::Committing,
            Self::Rewinding => InteractionPhase::Rewinding,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    deck: DeckStore,
    interaction: Interaction,
    generation: u64,
    fetch_in_flight: Option<u64>,
    prefetch: Option<JoinHandle<()>>,
    exhausted_notified: bool,
}

/// One deck session: a deck store, its single in-flight interaction, and the
/// event bus the presentation layer listens on.
pub struct SwipeOrchestrator {
    client: Arc<dyn DecisionClient>,
    bus: EventBus,
    config: OrchestratorConfig,
    state: StdMutex<SessionState>,
    metrics: SwipeMetrics,
}

impl SwipeOrchestrator {
    /// Create an orchestrator over an empty deck. Call [`Self::load_more`] to fill it.
    pub fn new(client: Arc<dyn DecisionClient>, mut config: OrchestratorConfig) -> Arc<Self> {
        config.visible_count = config.visible_count.max(1);
        config.page_size = config.page_size.max(1);
        config.event_capacity = config.event_capacity.max(1);

        let bus = EventBus::new(config.session_id.clone(), config.event_capacity);
        Arc::new(Self {
            client,
            bus,
            config,
            state: StdMutex::new(SessionState {
                deck: DeckStore::new(),
                interaction: Interaction::Idle,
                generation: 0,
                fetch_in_flight: None,
                prefetch: None,
                exhausted_notified: false,
            }),
            metrics: SwipeMetrics::default(),
        })
    }

    /// Effective config.
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Subscribe to deck events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SwipeEvent> {
        self.bus.subscribe()
    }

    /// Feed a released drag. Must be called from within a Tokio runtime.
    ///
    /// Like/pass start a decision; an upward flick opens details; anything
    /// else snaps back without touching the deck.
    pub fn submit_gesture(
        self: &Arc<Self>,
        delta: DragDelta,
        velocity: ReleaseVelocity,
    ) -> GestureResponse {
        let outcome = classify(delta, velocity, &self.config.thresholds);
        match outcome {
            GestureOutcome::Cancel => {
                SwipeMetrics::bump(&self.metrics.cancelled_gestures);
                tracing::debug!(
                    event = DeckLogEvent::GestureCancelled.as_str(),
                    dx = delta.dx,
                    dy = delta.dy,
                    "gesture snapped back"
                );
                GestureResponse::Cancelled
            }
            GestureOutcome::OpenDetails => GestureResponse::DetailsOpened(self.request_details()),
            GestureOutcome::Like | GestureOutcome::Pass | GestureOutcome::Superlike => {
                match outcome.decision_kind() {
                    Some(kind) => self.submit_decision(kind),
                    None => GestureResponse::Cancelled,
                }
            }
        }
    }

    /// Decide on the current card without a drag (buttons).
    pub fn submit_decision(self: &Arc<Self>, kind: DecisionKind) -> GestureResponse {
        self.accept(kind)
    }

    /// Explicit super-like action.
    pub fn submit_superlike(self: &Arc<Self>) -> GestureResponse {
        self.accept(DecisionKind::Superlike)
    }

    /// Ask the presentation layer to open the current card's profile.
    ///
    /// Allowed while a decision is in flight; never mutates the deck.
    pub fn request_details(&self) -> Option<CandidateId> {
        let candidate = self.lock_state().deck.current().cloned()?;
        tracing::debug!(
            event = DeckLogEvent::DetailsRequested.as_str(),
            candidate_id = %candidate.id,
            "details requested"
        );
        let candidate_id = candidate.id.clone();
        self.bus.publish(DeckEvent::DetailsRequested { candidate });
        Some(candidate_id)
    }

    /// Whether a rewind would be accepted right now.
    #[must_use]
    pub fn can_rewind(&self) -> bool {
        let state = self.lock_state();
        matches!(state.interaction, Interaction::Idle) && state.deck.rewind_slot().is_some()
    }

    /// Drop the deck (e.g. filters changed). A decision still in flight
    /// finishes against the backend but no longer touches this deck.
    pub fn reset(&self) {
        let generation = {
            let mut state = self.lock_state();
            state.deck.reset();
            state.generation += 1;
            state.fetch_in_flight = None;
            state.exhausted_notified = false;
            state.generation
        };
        tracing::info!(
            event = DeckLogEvent::DeckReset.as_str(),
            generation,
            "deck reset"
        );
        self.bus.publish(DeckEvent::DeckChanged {
            visible: Vec::new(),
        });
    }

    /// Current view of the session.
    #[must_use]
    pub fn snapshot(&self) -> DeckSnapshot {
        let state = self.lock_state();
        let pending = match &state.interaction {
            Interaction::Committing { decision } => Some(decision.clone()),
            Interaction::Idle | Interaction::Rewinding => None,
        };
        DeckSnapshot {
            session_id: self.config.session_id.clone(),
            generation: state.generation,
            cursor: state.deck.cursor(),
            len: state.deck.len(),
            remaining: state.deck.remaining(),
            visible: state.deck.peek(self.config.visible_count),
            can_rewind: matches!(state.interaction, Interaction::Idle)
                && state.deck.rewind_slot().is_some(),
            phase: state.interaction.phase(),
            pending,
        }
    }

    /// Lifetime counters.
    #[must_use]
    pub fn metrics(&self) -> SwipeMetricsSnapshot {
        self.metrics.snapshot()
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn publish_visible(&self, visible: Vec<Candidate>) {
        self.bus.publish(DeckEvent::DeckChanged { visible });
    }
}

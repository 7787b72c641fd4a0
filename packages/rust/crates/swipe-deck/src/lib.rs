//! Swipe deck engine: a candidate deck driven by drag gestures, with
//! optimistic decisions, match detection and a single-step rewind.
//!
//! - **Deck Store** ([`DeckStore`]): ordered candidates, cursor, rewind slot. No I/O.
//! - **Gesture Interpreter** ([`classify`]): drag + release velocity → outcome.
//! - **Swipe Orchestrator** ([`SwipeOrchestrator`]): single-flight state machine
//!   reconciling the deck with a [`DecisionClient`].
//! - **Presenter bridge** ([`Presenter`], [`spawn_presenter_loop`]): discrete deck
//!   events for the renderer.

mod client;
mod config;
mod deck;
mod error;
mod gesture;
mod observability;
mod orchestrator;
mod presenter;

pub use client::{DecisionClient, FetchRequest, MemoryDecisionClient};
pub use config::{
    DeckSettings, DecisionSettings, EventSettings, GestureSettings, SettingsError, SettingsPaths,
    SwipeSettings, load_swipe_settings, set_config_home_override,
};
pub use deck::{DeckStore, RewindSlot};
pub use error::{DeckError, SwipeError};
pub use gesture::{DragDelta, GestureOutcome, GestureThresholds, ReleaseVelocity, classify};
pub use orchestrator::{
    CommittedDecision, DeckSnapshot, GestureResponse, IgnoreReason, InteractionPhase,
    OrchestratorConfig, PendingDecision, PendingRewind, RewindResponse, SwipeMetricsSnapshot,
    SwipeOrchestrator,
};
pub use presenter::{Presenter, dispatch, spawn_presenter_loop};

pub use swipe_events::{DeckEvent, SwipeEvent};
pub use swipe_types::{
    Candidate, CandidateId, Decision, DecisionKind, DecisionReceipt, DecisionState, MatchInfo,
};

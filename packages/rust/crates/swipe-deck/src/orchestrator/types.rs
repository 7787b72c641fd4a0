//! Public types for driving the orchestrator and observing its state.

use std::time::Duration;

use serde::Serialize;
use swipe_types::{Candidate, CandidateId, Decision, MatchInfo};
use tokio::task::JoinHandle;

use crate::error::SwipeError;
use crate::gesture::GestureThresholds;

/// Config for one deck session.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Stamped on every published event.
    pub session_id: String,
    /// Gesture classification thresholds.
    pub thresholds: GestureThresholds,
    /// Cards included in `DeckChanged` (current card first).
    pub visible_count: usize,
    /// Fetch the next page once fewer undecided cards remain. 0 disables prefetch.
    pub prefetch_threshold: usize,
    /// Candidates requested per fetch.
    pub page_size: usize,
    /// Per-attempt bound on every backend call.
    pub decision_timeout: Duration,
    /// Extra `record_decision` attempts before a decision is declared failed.
    pub decision_retries: u32,
    /// Pause between record attempts.
    pub retry_backoff: Duration,
    /// Event bus capacity.
    pub event_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            session_id: "default".to_string(),
            thresholds: GestureThresholds::default(),
            visible_count: 3,
            prefetch_threshold: 5,
            page_size: 20,
            decision_timeout: Duration::from_secs(15),
            decision_retries: 1,
            retry_backoff: Duration::from_millis(250),
            event_capacity: 256,
        }
    }
}

/// What the orchestrator is doing right now.
///
/// Accepting a decision captures the card, records the rollback index and
/// advances the deck in one step, so there is no observable "deciding" phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionPhase {
    /// Ready for a decision or rewind.
    Idle,
    /// A decision is optimistically applied and awaiting the backend.
    Committing,
    /// A rewind is awaiting the backend.
    Rewinding,
}

/// Why a decision or rewind was not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Another decision or rewind is in flight.
    Busy,
    /// No card under the cursor.
    Exhausted,
}

/// Result of feeding a gesture or decision button into the orchestrator.
#[derive(Debug)]
pub enum GestureResponse {
    /// Gesture snapped back; nothing changed.
    Cancelled,
    /// Details were requested for the current card (if there was one).
    DetailsOpened(Option<CandidateId>),
    /// Decision not started; nothing changed.
    Ignored(IgnoreReason),
    /// Decision accepted and optimistically applied.
    Accepted(PendingDecision),
}

impl GestureResponse {
    /// The pending decision, if one was accepted.
    #[must_use]
    pub fn into_pending(self) -> Option<PendingDecision> {
        match self {
            Self::Accepted(pending) => Some(pending),
            _ => None,
        }
    }
}

/// A decision confirmed by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedDecision {
    /// The decision, in `Committed` state.
    pub decision: Decision,
    /// Match announced for this decision.
    pub match_info: Option<MatchInfo>,
}

/// Handle to a decision running in the background.
///
/// Dropping the handle does not cancel the decision; it always runs to
/// completion so the deck and the backend agree.
#[derive(Debug)]
pub struct PendingDecision {
    pub(super) decision: Decision,
    pub(super) handle: JoinHandle<Result<CommittedDecision, SwipeError>>,
}

impl PendingDecision {
    /// The decision as accepted (`Pending`).
    #[must_use]
    pub fn decision(&self) -> &Decision {
        &self.decision
    }

    /// Wait for the backend to confirm or the rollback to finish.
    ///
    /// # Errors
    /// `SwipeError::DecisionRecordFailed` after a rollback.
    pub async fn settle(self) -> Result<CommittedDecision, SwipeError> {
        match self.handle.await {
            Ok(result) => result,
            Err(error) => Err(SwipeError::Background(error.to_string())),
        }
    }
}

/// Result of asking for a rewind.
#[derive(Debug)]
pub enum RewindResponse {
    /// No pass to undo; nothing changed.
    NothingToRewind,
    /// Rewind not started; nothing changed.
    Ignored(IgnoreReason),
    /// Backend delete in flight.
    Accepted(PendingRewind),
}

impl RewindResponse {
    /// The pending rewind, if one was accepted.
    #[must_use]
    pub fn into_pending(self) -> Option<PendingRewind> {
        match self {
            Self::Accepted(pending) => Some(pending),
            _ => None,
        }
    }
}

/// Handle to a rewind running in the background.
#[derive(Debug)]
pub struct PendingRewind {
    pub(super) candidate_id: CandidateId,
    pub(super) handle: JoinHandle<Result<CandidateId, SwipeError>>,
}

impl PendingRewind {
    /// Candidate being restored.
    #[must_use]
    pub fn candidate_id(&self) -> &CandidateId {
        &self.candidate_id
    }

    /// Wait for the rewind to apply or fail.
    ///
    /// # Errors
    /// `SwipeError::RewindFailed` when the backend refused; the pass stays rewindable.
    pub async fn settle(self) -> Result<CandidateId, SwipeError> {
        match self.handle.await {
            Ok(result) => result,
            Err(error) => Err(SwipeError::Background(error.to_string())),
        }
    }
}

/// Point-in-time view of the deck session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckSnapshot {
    /// Session id.
    pub session_id: String,
    /// Bumped on every reset.
    pub generation: u64,
    /// Absolute cursor.
    pub cursor: usize,
    /// Absolute deck length.
    pub len: usize,
    /// Undecided cards left.
    pub remaining: usize,
    /// Top of the deck.
    pub visible: Vec<Candidate>,
    /// A rewind would be accepted now.
    pub can_rewind: bool,
    /// Current phase.
    pub phase: InteractionPhase,
    /// Decision awaiting the backend.
    pub pending: Option<Decision>,
}
